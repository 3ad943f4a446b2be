//! Tunable thresholds for classification and obstacle fitting.

use rrl_profile::DataError;

/// Configurable parameters for obstruction analysis.
///
/// The defaults reproduce the reference thresholds of the planning method;
/// every field can be overridden from a YAML document when the `serde`
/// feature is enabled.
///
/// # Example
///
/// ```
/// use rrl_obstruction::ObstructionParams;
///
/// let params = ObstructionParams {
///     max_gap: 4,
///     ..Default::default()
/// };
/// assert_eq!(params.half_open_max_relative, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObstructionParams {
    // Classification
    /// Minimum vertical clearance for a half-open sample (meters).
    pub half_open_min_clearance_m: f64,
    /// Upper bound (exclusive) on relative clearance for a half-open sample.
    pub half_open_max_relative: f64,

    // Merging
    /// Largest run of open samples an obstructed segment bridges.
    pub max_gap: usize,

    // Diffraction
    /// Reflection-region length, as a fraction of the path, at or below which
    /// an open segment uses the plane criterion.
    pub plane_region_fraction: f64,
    /// Factor applied to `l² / (8 Δy)` to obtain the sphere radius (m to km).
    pub sphere_radius_scale: f64,
    /// Samples added on each side of a segment when fitting its obstacle.
    pub obstacle_window_margin: usize,

    // Geometry
    /// Effective earth radius factor; `None` keeps a flat-earth profile.
    pub refraction_k_factor: Option<f64>,

    // Execution
    /// Minimum number of segments before processing moves onto the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for ObstructionParams {
    fn default() -> Self {
        Self {
            // Classification
            half_open_min_clearance_m: 0.1,
            half_open_max_relative: 0.1,

            // Merging
            max_gap: 3,

            // Diffraction
            plane_region_fraction: 0.25,
            sphere_radius_scale: 0.001,
            obstacle_window_margin: 1,

            // Geometry
            refraction_k_factor: None,

            // Execution
            parallel_threshold: 8,
        }
    }
}

impl ObstructionParams {
    /// Reject values that would make classification or the loss formulas
    /// meaningless. Called before every evaluation and when loading
    /// parameters from a file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidParameter`] naming the offending field, or
    /// [`DataError::NonPositiveRefraction`] for a bad k-factor.
    pub fn validate(&self) -> Result<(), DataError> {
        check("half_open_min_clearance_m", self.half_open_min_clearance_m, |v| {
            v.is_finite()
        })?;
        check("half_open_max_relative", self.half_open_max_relative, |v| {
            v.is_finite() && v > 0.0
        })?;
        check("plane_region_fraction", self.plane_region_fraction, |v| {
            v.is_finite() && v >= 0.0
        })?;
        check("sphere_radius_scale", self.sphere_radius_scale, |v| {
            v.is_finite() && v > 0.0
        })?;
        match self.refraction_k_factor {
            Some(k) if !(k.is_finite() && k > 0.0) => Err(DataError::NonPositiveRefraction(k)),
            _ => Ok(()),
        }
    }
}

fn check(name: &'static str, value: f64, valid: impl Fn(f64) -> bool) -> Result<(), DataError> {
    if valid(value) {
        Ok(())
    } else {
        Err(DataError::InvalidParameter { name, value })
    }
}
