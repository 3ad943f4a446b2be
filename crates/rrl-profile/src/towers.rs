//! Tower endpoints and the line of sight between them.

use crate::{DataError, TerrainProfile};

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Convert a carrier frequency in MHz to a wavelength in meters.
pub fn wavelength_from_mhz(freq_mhz: f64) -> Result<f64, DataError> {
    if !(freq_mhz.is_finite() && freq_mhz > 0.0) {
        return Err(DataError::NonPositiveFrequency(freq_mhz));
    }
    Ok(SPEED_OF_LIGHT / (freq_mhz * 1e6))
}

/// One end of the link.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tower {
    /// Horizontal position along the path (meters).
    pub position_m: f64,
    /// Absolute antenna height, same datum as the terrain samples (meters).
    pub height_m: f64,
}

/// Sender and receiver antennas.
///
/// The sender always sits at position 0 and the receiver at the path length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TowerPair {
    /// Transmitting end, at position 0.
    pub sender: Tower,
    /// Receiving end, at the path length.
    pub receiver: Tower,
}

impl TowerPair {
    /// Create a tower pair from absolute antenna heights.
    pub fn new(
        path_length_m: f64,
        sender_height_m: f64,
        receiver_height_m: f64,
    ) -> Result<Self, DataError> {
        if !(path_length_m.is_finite() && path_length_m > 0.0) {
            return Err(DataError::NonPositivePathLength(path_length_m));
        }
        if !sender_height_m.is_finite() {
            return Err(DataError::NonFiniteTowerHeight {
                side: "sender",
                value: sender_height_m,
            });
        }
        if !receiver_height_m.is_finite() {
            return Err(DataError::NonFiniteTowerHeight {
                side: "receiver",
                value: receiver_height_m,
            });
        }

        Ok(Self {
            sender: Tower {
                position_m: 0.0,
                height_m: sender_height_m,
            },
            receiver: Tower {
                position_m: path_length_m,
                height_m: receiver_height_m,
            },
        })
    }

    /// Create a tower pair from antenna heights above the ground at each end.
    ///
    /// The ground level is taken from the first and last profile samples.
    pub fn above_ground(
        profile: &TerrainProfile,
        sender_agl_m: f64,
        receiver_agl_m: f64,
    ) -> Result<Self, DataError> {
        Self::from_antennas(
            profile,
            AntennaHeight::AboveGround(sender_agl_m),
            AntennaHeight::AboveGround(receiver_agl_m),
        )
    }

    /// Create a tower pair spanning `profile`, each antenna height given
    /// either absolutely or above the ground at its end.
    pub fn from_antennas(
        profile: &TerrainProfile,
        sender: AntennaHeight,
        receiver: AntennaHeight,
    ) -> Result<Self, DataError> {
        Self::new(
            profile.path_length_m(),
            sender.resolve(profile.elevation(0)),
            receiver.resolve(profile.elevation(profile.last_index())),
        )
    }

    /// Distance between the two towers (meters).
    pub fn path_length_m(&self) -> f64 {
        self.receiver.position_m - self.sender.position_m
    }

    /// The line of sight joining the tower tops.
    pub fn line_of_sight(&self) -> LineOfSight {
        LineOfSight {
            start: self.sender,
            end: self.receiver,
        }
    }
}

/// How an antenna height is measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AntennaHeight {
    /// Height above the elevation datum (meters).
    Absolute(f64),
    /// Height above the ground at the link end (meters).
    AboveGround(f64),
}

impl AntennaHeight {
    /// Absolute height given the ground elevation at the antenna.
    pub fn resolve(self, ground_m: f64) -> f64 {
        match self {
            AntennaHeight::Absolute(height) => height,
            AntennaHeight::AboveGround(height) => ground_m + height,
        }
    }
}

/// Straight line between the two tower tops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOfSight {
    start: Tower,
    end: Tower,
}

impl LineOfSight {
    /// Height of the line of sight at horizontal position `x_m`.
    pub fn height_at(&self, x_m: f64) -> f64 {
        let span = self.end.position_m - self.start.position_m;
        let t = (x_m - self.start.position_m) / span;
        self.start.height_m + (self.end.height_m - self.start.height_m) * t
    }

    /// Slope of the line of sight (meters per meter).
    pub fn slope(&self) -> f64 {
        (self.end.height_m - self.start.height_m) / (self.end.position_m - self.start.position_m)
    }
}
