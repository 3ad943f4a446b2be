//! # rrl-profile
//!
//! Terrain profile geometry for line-of-sight radio-relay links.
//!
//! This crate turns a sampled elevation profile and a pair of antenna towers
//! into per-sample clearance metrics: the vertical clearance `H` below the
//! line of sight, the critical clearance `H0` at the first Fresnel zone, and
//! the relative clearance `h0 = H / H0`.
//!
//! ## Example
//!
//! ```
//! use rrl_profile::{compute_clearance, wavelength_from_mhz, TerrainProfile, TowerPair};
//!
//! let profile = TerrainProfile::new(vec![120.0, 135.0, 150.0, 140.0, 125.0], 5_000.0)?;
//! let towers = TowerPair::above_ground(&profile, 40.0, 40.0)?;
//! let wavelength = wavelength_from_mhz(8_000.0)?;
//!
//! let series = compute_clearance(&profile, &towers, wavelength)?;
//! assert_eq!(series.len(), profile.len());
//! # Ok::<(), rrl_profile::DataError>(())
//! ```

mod clearance;
mod error;
mod profile;
mod towers;

pub use clearance::{
    compute_clearance, compute_clearance_with_refraction, critical_clearance, ClearanceSeries,
};
pub use error::DataError;
pub use profile::{ProfileStatistics, TerrainProfile, EARTH_RADIUS_M, STANDARD_K_FACTOR};
pub use towers::{
    wavelength_from_mhz, AntennaHeight, LineOfSight, Tower, TowerPair, SPEED_OF_LIGHT,
};

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, DataError>;
