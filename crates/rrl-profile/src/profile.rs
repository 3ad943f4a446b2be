//! Terrain elevation profile between two towers.

use crate::DataError;

/// Mean earth radius used for the curvature correction (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Standard-atmosphere refraction factor (4/3 earth).
pub const STANDARD_K_FACTOR: f64 = 4.0 / 3.0;

/// Ordered elevation samples along a radio path.
///
/// Sample `i` sits at horizontal position `i · spacing`, with the spacing
/// fixed at construction as `path_length / sample_count`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TerrainProfile {
    elevations: Vec<f64>,
    path_length_m: f64,
}

impl TerrainProfile {
    /// Create a profile from elevation samples in meters.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] when fewer than two samples are given, the path
    /// length is not positive, or any elevation is not finite.
    pub fn new(elevations: Vec<f64>, path_length_m: f64) -> Result<Self, DataError> {
        if elevations.len() < 2 {
            return Err(DataError::TooFewSamples {
                count: elevations.len(),
            });
        }
        if !(path_length_m.is_finite() && path_length_m > 0.0) {
            return Err(DataError::NonPositivePathLength(path_length_m));
        }
        if let Some((index, value)) = elevations
            .iter()
            .enumerate()
            .find(|(_, e)| !e.is_finite())
        {
            return Err(DataError::NonFiniteElevation {
                index,
                value: *value,
            });
        }

        Ok(Self {
            elevations,
            path_length_m,
        })
    }

    /// Create a profile from a slice of elevations.
    pub fn from_elevations(path_length_m: f64, elevations: &[f64]) -> Result<Self, DataError> {
        Self::new(elevations.to_vec(), path_length_m)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    /// Always false; a profile holds at least two samples.
    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    /// Total path length in meters.
    pub fn path_length_m(&self) -> f64 {
        self.path_length_m
    }

    /// Distance between consecutive samples in meters.
    pub fn spacing_m(&self) -> f64 {
        self.path_length_m / self.elevations.len() as f64
    }

    /// Horizontal position of sample `index` in meters.
    pub fn position_m(&self, index: usize) -> f64 {
        index as f64 * self.spacing_m()
    }

    /// Normalized position `k = position / path_length` of sample `index`.
    pub fn normalized_position(&self, index: usize) -> f64 {
        self.position_m(index) / self.path_length_m
    }

    /// Elevation of sample `index` in meters.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn elevation(&self, index: usize) -> f64 {
        self.elevations[index]
    }

    /// All elevation samples.
    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    /// Index of the last sample.
    pub fn last_index(&self) -> usize {
        self.elevations.len() - 1
    }

    /// Elevations raised by the earth bulge for an effective earth radius
    /// `k_factor · EARTH_RADIUS_M`.
    ///
    /// The bulge at position `x` is `x (R0 − x) / (2 k Re)`; it is zero at
    /// the sender and largest mid-path.
    pub fn with_earth_bulge(&self, k_factor: f64) -> Result<Vec<f64>, DataError> {
        if !(k_factor.is_finite() && k_factor > 0.0) {
            return Err(DataError::NonPositiveRefraction(k_factor));
        }
        let effective_radius = k_factor * EARTH_RADIUS_M;
        Ok(self
            .elevations
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let x = self.position_m(i);
                e + x * (self.path_length_m - x) / (2.0 * effective_radius)
            })
            .collect())
    }

    /// Minimum, maximum and mean elevation.
    pub fn statistics(&self) -> ProfileStatistics {
        let min = self.elevations.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self
            .elevations
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let mean = self.elevations.iter().sum::<f64>() / self.elevations.len() as f64;
        ProfileStatistics {
            min_elevation: min,
            max_elevation: max,
            mean_elevation: mean,
            delta_h: max - min,
        }
    }
}

/// Summary of the terrain along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileStatistics {
    /// Lowest elevation (meters).
    pub min_elevation: f64,
    /// Highest elevation (meters).
    pub max_elevation: f64,
    /// Mean elevation (meters).
    pub mean_elevation: f64,
    /// Terrain irregularity, max minus min (meters).
    pub delta_h: f64,
}
