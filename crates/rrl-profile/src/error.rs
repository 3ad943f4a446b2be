//! Error types for profile geometry.

use thiserror::Error;

/// Malformed or insufficient input.
///
/// A `DataError` is fatal to the current evaluation and is always surfaced to
/// the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The profile has fewer than two elevation samples.
    #[error("Terrain profile needs at least 2 samples, got {count}")]
    TooFewSamples {
        /// Number of samples supplied.
        count: usize,
    },

    /// Wavelength is zero, negative or not a number.
    #[error("Wavelength must be positive, got {0} m")]
    NonPositiveWavelength(f64),

    /// Frequency is zero, negative or not a number.
    #[error("Frequency must be positive, got {0} MHz")]
    NonPositiveFrequency(f64),

    /// Path length is zero, negative or not a number.
    #[error("Path length must be positive, got {0} m")]
    NonPositivePathLength(f64),

    /// Two sequences that must be index-aligned have different lengths.
    #[error("Length mismatch: expected {expected} entries, got {actual}")]
    LengthMismatch {
        /// Length of the reference sequence.
        expected: usize,
        /// Length of the offending sequence.
        actual: usize,
    },

    /// Tower placement disagrees with the profile's path length.
    #[error("Towers span {towers_m} m but the profile spans {profile_m} m")]
    PathLengthMismatch {
        /// Path length of the profile.
        profile_m: f64,
        /// Distance between the towers.
        towers_m: f64,
    },

    /// An elevation sample is NaN or infinite.
    #[error("Invalid elevation at sample {index}: {value}")]
    NonFiniteElevation {
        /// Sample index.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// A tower height is NaN or infinite.
    #[error("Invalid {side} tower height: {value}")]
    NonFiniteTowerHeight {
        /// `"sender"` or `"receiver"`.
        side: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Refraction factor for the earth-curvature correction is not positive.
    #[error("Refraction k-factor must be positive, got {0}")]
    NonPositiveRefraction(f64),

    /// A tuning parameter is out of range.
    #[error("Invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Classification produced no categories to merge.
    #[error("No categories to merge")]
    EmptyCategories,
}
