//! Recoverable faults raised while fitting obstacles and evaluating formulas.
//!
//! Neither kind aborts an evaluation. The affected segment is still reported,
//! with the fault attached to its [`LossEstimate`](crate::LossEstimate).

use crate::tangent::TowerSide;
use thiserror::Error;

/// An obstacle could not be fitted to the terrain.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryFault {
    /// No line from the tower stays on or above the terrain of the range.
    #[error("No tangent from the {side} tower over samples {start}..={end}")]
    NoTangentFound {
        /// Tower the search was anchored on.
        side: TowerSide,
        /// First sample of the searched range.
        start: usize,
        /// Last sample of the searched range.
        end: usize,
    },

    /// The terrain never separates from the tangent, so no chord height exists.
    #[error("Obstacle over samples {start}..={end} has no measurable chord height")]
    DegenerateObstacle {
        /// First sample of the searched range.
        start: usize,
        /// Last sample of the searched range.
        end: usize,
    },
}

/// A formula was evaluated at or near a singular point and its input was clamped.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericFault {
    /// The relief slope `4 + 10 / (μ − 0.1)` was evaluated with `μ` near 0.1.
    #[error("Relief parameter {mu} is too close to 0.1; slope denominator clamped")]
    ReliefSingularity {
        /// The relief parameter that triggered the clamp.
        mu: f64,
    },

    /// Normalized position was pushed into the open interval (0, 1).
    #[error("Normalized position {k} at sample {index} clamped into (0, 1)")]
    PositionClamped {
        /// Sample index.
        index: usize,
        /// The position before clamping.
        k: f64,
    },

    /// The obstruction point carries a zero critical clearance.
    #[error("Zero critical clearance at sample {index}; recomputed at the clamped position")]
    BoundaryClearance {
        /// Sample index.
        index: usize,
    },

    /// The plane interference term vanished and was floored.
    #[error("Plane interference term {value} floored to avoid log of zero")]
    InterferenceFloor {
        /// The interference term before flooring.
        value: f64,
    },
}

/// Either kind of recoverable fault.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fault {
    /// Obstacle fitting failed.
    #[error(transparent)]
    Geometry(#[from] GeometryFault),

    /// A formula input was clamped.
    #[error(transparent)]
    Numeric(#[from] NumericFault),
}
