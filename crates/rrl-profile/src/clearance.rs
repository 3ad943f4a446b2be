//! Per-sample clearance metrics.
//!
//! For every profile sample this module derives:
//! - `H`, the vertical clearance between the line of sight and the terrain
//! - `H0`, the critical clearance at the edge of the first Fresnel zone
//!   reduced by `sqrt(3)`
//! - `h0 = H / H0`, the relative clearance
//!
//! `H0` vanishes at both ends of the path. At those indices `h0` is set to
//! zero instead of dividing.

use crate::{DataError, TerrainProfile, TowerPair};
use tracing::trace;

/// Relative tolerance when comparing the tower span with the profile span.
const PATH_LENGTH_TOLERANCE: f64 = 1e-9;

/// Critical clearance `sqrt(R0 · λ · k · (1 − k) / 3)` at normalized position `k`.
pub fn critical_clearance(path_length_m: f64, wavelength_m: f64, k: f64) -> f64 {
    let product = path_length_m * wavelength_m * k * (1.0 - k) / 3.0;
    if product <= 0.0 {
        0.0
    } else {
        product.sqrt()
    }
}

/// Clearance metrics, index-aligned with the profile they were derived from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClearanceSeries {
    /// Terrain elevations the clearances were measured against (meters).
    pub terrain: Vec<f64>,
    /// Line-of-sight height at each sample (meters).
    pub los_height: Vec<f64>,
    /// Vertical clearance `H` (meters, negative when terrain is above the line of sight).
    pub clearance: Vec<f64>,
    /// Critical clearance `H0` (meters).
    pub critical: Vec<f64>,
    /// Relative clearance `h0 = H / H0`.
    pub relative: Vec<f64>,
    /// Path length `R0` (meters).
    pub path_length_m: f64,
    /// Carrier wavelength (meters).
    pub wavelength_m: f64,
    /// Sample spacing (meters).
    pub spacing_m: f64,
}

impl ClearanceSeries {
    /// Build a series from precomputed `H`, `H0` and `h0` sequences.
    ///
    /// Terrain and line-of-sight heights are filled with zeros; this is meant
    /// for callers that already hold clearance values.
    pub fn from_parts(
        clearance: Vec<f64>,
        critical: Vec<f64>,
        relative: Vec<f64>,
        path_length_m: f64,
        wavelength_m: f64,
    ) -> Result<Self, DataError> {
        let n = clearance.len();
        for other in [critical.len(), relative.len()] {
            if other != n {
                return Err(DataError::LengthMismatch {
                    expected: n,
                    actual: other,
                });
            }
        }
        if !(path_length_m.is_finite() && path_length_m > 0.0) {
            return Err(DataError::NonPositivePathLength(path_length_m));
        }
        if !(wavelength_m.is_finite() && wavelength_m > 0.0) {
            return Err(DataError::NonPositiveWavelength(wavelength_m));
        }
        let spacing_m = if n == 0 { 0.0 } else { path_length_m / n as f64 };

        Ok(Self {
            terrain: vec![0.0; n],
            los_height: vec![0.0; n],
            clearance,
            critical,
            relative,
            path_length_m,
            wavelength_m,
            spacing_m,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.clearance.len()
    }

    /// True when the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.clearance.is_empty()
    }

    /// Horizontal position of sample `index` (meters).
    pub fn position_m(&self, index: usize) -> f64 {
        index as f64 * self.spacing_m
    }

    /// Normalized position `k` of sample `index`.
    pub fn normalized_position(&self, index: usize) -> f64 {
        self.position_m(index) / self.path_length_m
    }

    /// True where the critical clearance is zero and `h0` carries the
    /// boundary convention rather than a ratio.
    pub fn is_boundary(&self, index: usize) -> bool {
        self.critical[index] == 0.0
    }

    /// Radius of the first Fresnel zone at sample `index` (meters).
    pub fn fresnel_radius(&self, index: usize) -> f64 {
        let k = self.normalized_position(index);
        critical_clearance(self.path_length_m, self.wavelength_m, k) * 3f64.sqrt()
    }
}

/// Compute clearance metrics for `profile` under the line of sight of `towers`.
///
/// # Errors
///
/// Returns [`DataError`] if the wavelength is not positive or the towers do
/// not span the profile.
pub fn compute_clearance(
    profile: &TerrainProfile,
    towers: &TowerPair,
    wavelength_m: f64,
) -> Result<ClearanceSeries, DataError> {
    compute_clearance_with_terrain(profile, profile.elevations(), towers, wavelength_m)
}

/// Compute clearance metrics with the earth bulge for refraction factor
/// `k_factor` added to the terrain.
pub fn compute_clearance_with_refraction(
    profile: &TerrainProfile,
    towers: &TowerPair,
    wavelength_m: f64,
    k_factor: f64,
) -> Result<ClearanceSeries, DataError> {
    let raised = profile.with_earth_bulge(k_factor)?;
    compute_clearance_with_terrain(profile, &raised, towers, wavelength_m)
}

fn compute_clearance_with_terrain(
    profile: &TerrainProfile,
    terrain: &[f64],
    towers: &TowerPair,
    wavelength_m: f64,
) -> Result<ClearanceSeries, DataError> {
    if profile.len() < 2 {
        return Err(DataError::TooFewSamples {
            count: profile.len(),
        });
    }
    if !(wavelength_m.is_finite() && wavelength_m > 0.0) {
        return Err(DataError::NonPositiveWavelength(wavelength_m));
    }
    if terrain.len() != profile.len() {
        return Err(DataError::LengthMismatch {
            expected: profile.len(),
            actual: terrain.len(),
        });
    }
    let path_length_m = profile.path_length_m();
    let towers_m = towers.path_length_m();
    if (towers_m - path_length_m).abs() > PATH_LENGTH_TOLERANCE * path_length_m {
        return Err(DataError::PathLengthMismatch {
            profile_m: path_length_m,
            towers_m,
        });
    }

    let los = towers.line_of_sight();
    let last = profile.last_index();
    let n = profile.len();

    let mut los_height = Vec::with_capacity(n);
    let mut clearance = Vec::with_capacity(n);
    let mut critical = Vec::with_capacity(n);
    let mut relative = Vec::with_capacity(n);

    for (i, &ground) in terrain.iter().enumerate() {
        let x = profile.position_m(i);
        let line = los.height_at(x);
        let h = line - ground;
        let h0_crit = if i == last {
            // Receiver end: forced to zero regardless of k.
            0.0
        } else {
            critical_clearance(path_length_m, wavelength_m, profile.normalized_position(i))
        };
        let rel = if h0_crit == 0.0 {
            trace!(index = i, "critical clearance is zero, relative clearance set to 0");
            0.0
        } else {
            h / h0_crit
        };

        los_height.push(line);
        clearance.push(h);
        critical.push(h0_crit);
        relative.push(rel);
    }

    Ok(ClearanceSeries {
        terrain: terrain.to_vec(),
        los_height,
        clearance,
        critical,
        relative,
        path_length_m,
        wavelength_m,
        spacing_m: profile.spacing_m(),
    })
}
