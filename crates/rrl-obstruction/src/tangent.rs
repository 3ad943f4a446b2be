//! Tangent envelopes from a tower over a stretch of terrain.
//!
//! A tangent is the line from a tower apex that touches the terrain of a
//! range without dipping below it anywhere in that range. Its touching point
//! marks the top of the obstacle as seen from that tower.

use crate::GeometryFault;
use rrl_profile::{ClearanceSeries, Tower};
use std::ops::RangeInclusive;

/// Relative tolerance for "on or above the terrain" comparisons.
const TERRAIN_TOLERANCE: f64 = 1e-9;

/// Which tower a tangent is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TowerSide {
    /// Transmitting end.
    Sender,
    /// Receiving end.
    Receiver,
}

impl std::fmt::Display for TowerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TowerSide::Sender => write!(f, "sender"),
            TowerSide::Receiver => write!(f, "receiver"),
        }
    }
}

/// A line `y = slope · x + intercept` touching the terrain at `tangent_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TangentLine {
    /// Tower the line is anchored on.
    pub side: TowerSide,
    /// Rise per meter.
    pub slope: f64,
    /// Height at position 0 (meters).
    pub intercept: f64,
    /// Sample where the line touches the terrain.
    pub tangent_index: usize,
}

impl TangentLine {
    /// Height of the line at horizontal position `x_m`.
    pub fn height_at(&self, x_m: f64) -> f64 {
        self.slope * x_m + self.intercept
    }
}

fn tolerance(value: f64) -> f64 {
    TERRAIN_TOLERANCE * value.abs().max(1.0)
}

/// Find the tangent from `anchor` over the terrain samples in `range`.
///
/// Every sample `j` of the range proposes the line through the anchor and
/// `(j · Δ, terrain[j])`. A proposal is valid when the line is on or above
/// the terrain at every sample of the range. Among valid proposals the one
/// touching the lowest terrain point is kept, the first on ties.
///
/// # Errors
///
/// Returns [`GeometryFault::NoTangentFound`] when no proposal is valid,
/// including ranges that hold only the sample directly below the anchor.
pub fn find_tangent_envelope(
    series: &ClearanceSeries,
    anchor: &Tower,
    side: TowerSide,
    range: RangeInclusive<usize>,
) -> Result<TangentLine, GeometryFault> {
    let start = *range.start();
    let end = (*range.end()).min(series.len().saturating_sub(1));
    let not_found = GeometryFault::NoTangentFound { side, start, end };
    if series.is_empty() || start > end {
        return Err(not_found);
    }

    let terrain = &series.terrain;
    let mut best: Option<TangentLine> = None;

    for j in start..=end {
        let dx = series.position_m(j) - anchor.position_m;
        if dx.abs() <= f64::EPSILON * series.path_length_m {
            continue;
        }
        let slope = (terrain[j] - anchor.height_m) / dx;
        let intercept = anchor.height_m - slope * anchor.position_m;
        let candidate = TangentLine {
            side,
            slope,
            intercept,
            tangent_index: j,
        };

        let valid = (start..=end).all(|i| {
            candidate.height_at(series.position_m(i)) >= terrain[i] - tolerance(terrain[i])
        });
        if !valid {
            continue;
        }

        let lower = match best {
            Some(current) => terrain[j] < terrain[current.tangent_index],
            None => true,
        };
        if lower {
            best = Some(candidate);
        }
    }

    best.ok_or(not_found)
}

/// Chord height `Δy` of the obstacle under `tangent`.
///
/// This is half the vertical gap between the tangent and the terrain at the
/// point of closest approach, i.e. the non-touching sample of `range` with
/// the smallest positive gap.
///
/// # Errors
///
/// Returns [`GeometryFault::DegenerateObstacle`] when every sample of the
/// range lies on the tangent.
pub fn chord_height(
    series: &ClearanceSeries,
    tangent: &TangentLine,
    range: RangeInclusive<usize>,
) -> Result<f64, GeometryFault> {
    let start = *range.start();
    let end = (*range.end()).min(series.len().saturating_sub(1));

    let closest = (start..=end)
        .filter(|&i| i != tangent.tangent_index)
        .map(|i| tangent.height_at(series.position_m(i)) - series.terrain[i])
        .filter(|gap| *gap > tolerance(*gap))
        .fold(None, |acc: Option<f64>, gap| match acc {
            Some(min) if min <= gap => Some(min),
            _ => Some(gap),
        });

    closest
        .map(|gap| gap / 2.0)
        .ok_or(GeometryFault::DegenerateObstacle { start, end })
}

/// Both tangents over a range and the one that governs the obstacle.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleFit {
    /// Tangent from the sender, if one exists.
    pub sender: Option<TangentLine>,
    /// Tangent from the receiver, if one exists.
    pub receiver: Option<TangentLine>,
    /// The tangent touching the lower obstruction point.
    pub governing: TangentLine,
    /// Chord height under the governing tangent (meters).
    pub chord_height_m: f64,
}

/// Fit an obstacle over `range` by running the tangent search from both towers.
///
/// The governing tangent is the one whose touching point is lower; the sender
/// wins ties. A search that fails on one side is tolerated as long as the
/// other side succeeds.
pub fn fit_obstacle(
    series: &ClearanceSeries,
    sender: &Tower,
    receiver: &Tower,
    range: RangeInclusive<usize>,
) -> Result<ObstacleFit, GeometryFault> {
    let from_sender = find_tangent_envelope(series, sender, TowerSide::Sender, range.clone());
    let from_receiver = find_tangent_envelope(series, receiver, TowerSide::Receiver, range.clone());

    let governing = match (&from_sender, &from_receiver) {
        (Ok(s), Ok(r)) => {
            if series.terrain[r.tangent_index] < series.terrain[s.tangent_index] {
                *r
            } else {
                *s
            }
        }
        (Ok(s), Err(_)) => *s,
        (Err(_), Ok(r)) => *r,
        (Err(e), Err(_)) => return Err(e.clone()),
    };

    let chord_height_m = chord_height(series, &governing, range)?;

    Ok(ObstacleFit {
        sender: from_sender.ok(),
        receiver: from_receiver.ok(),
        governing,
        chord_height_m,
    })
}
