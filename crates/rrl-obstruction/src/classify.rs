//! Per-sample obstruction category.

use crate::ObstructionParams;
use rrl_profile::{ClearanceSeries, DataError};

/// Obstruction state of a sample or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    /// The first Fresnel zone is clear.
    Open,
    /// Terrain grazes the line of sight inside the critical clearance.
    HalfOpen,
    /// Terrain rises above the line of sight.
    Closed,
}

impl Category {
    /// True for half-open and closed.
    pub fn is_obstructed(self) -> bool {
        !matches!(self, Category::Open)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Category::Open => "open",
            Category::HalfOpen => "half-open",
            Category::Closed => "closed",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classify one sample from its clearance `h`, critical clearance `h0_crit`
/// and relative clearance `rel`.
///
/// Rules are tried in order and the first match wins:
/// 1. `h ≥ H0` and `h0 ≥ 0` → open
/// 2. `H0 > h`, `h > 0.1` and `0 < h0 < 0.1` → half-open
/// 3. `H0 > h` and `h0 < 0` → closed
/// 4. anything else → open
pub fn classify_sample(h: f64, h0_crit: f64, rel: f64, params: &ObstructionParams) -> Category {
    if h >= h0_crit && rel >= 0.0 {
        Category::Open
    } else if h0_crit > h
        && h > params.half_open_min_clearance_m
        && rel > 0.0
        && rel < params.half_open_max_relative
    {
        Category::HalfOpen
    } else if h0_crit > h && rel < 0.0 {
        Category::Closed
    } else {
        Category::Open
    }
}

/// Classify every sample of `series` with default thresholds.
pub fn classify(series: &ClearanceSeries) -> Result<Vec<Category>, DataError> {
    classify_with_params(series, &ObstructionParams::default())
}

/// Classify every sample of `series`.
///
/// # Errors
///
/// Returns [`DataError::LengthMismatch`] if the three clearance sequences are
/// not index-aligned.
pub fn classify_with_params(
    series: &ClearanceSeries,
    params: &ObstructionParams,
) -> Result<Vec<Category>, DataError> {
    let n = series.clearance.len();
    for other in [series.critical.len(), series.relative.len()] {
        if other != n {
            return Err(DataError::LengthMismatch {
                expected: n,
                actual: other,
            });
        }
    }

    Ok(series
        .clearance
        .iter()
        .zip(&series.critical)
        .zip(&series.relative)
        .map(|((&h, &crit), &rel)| classify_sample(h, crit, rel, params))
        .collect())
}
