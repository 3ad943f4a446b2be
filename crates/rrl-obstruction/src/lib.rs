//! # rrl-obstruction
//!
//! Terrain obstruction analysis for line-of-sight radio-relay links.
//!
//! Given the clearance metrics of a profile, this crate classifies every
//! sample, merges the samples into segments and estimates a diffraction loss
//! for each segment.
//!
//! ## Features
//!
//! - **Classification**: open, half-open and closed samples from `H`, `H0`, `h0`
//! - **Segment merging**: maximal runs with short open gaps bridged
//! - **Obstacle fitting**: tangent envelopes from both towers and chord heights
//! - **Loss models**: plane, sphere and wedge approximations
//!   (see [`diffraction`])
//!
//! ## Example
//!
//! ```
//! use rrl_obstruction::{evaluate, Category, DiffractionModel};
//! use rrl_profile::{TerrainProfile, TowerPair};
//!
//! let mut elevations = vec![0.0; 100];
//! elevations[50] = 29.7;
//! let profile = TerrainProfile::new(elevations, 10_000.0)?;
//! let towers = TowerPair::new(10_000.0, 30.0, 30.0)?;
//!
//! let evaluation = evaluate(&profile, &towers, 0.05)?;
//! let worst = evaluation.worst().expect("at least one segment");
//! assert_eq!(worst.segment.category, Category::HalfOpen);
//! assert_eq!(worst.estimate.model, DiffractionModel::Sphere);
//! # Ok::<(), rrl_profile::DataError>(())
//! ```

mod approximation;
mod classify;
mod crossings;
pub mod diffraction;
mod error;
mod params;
mod processor;
mod segment;
mod tangent;

pub use approximation::{
    perpendicular_deviation, ClosedDetails, ObstacleGeometry, Reflection, SegmentReport,
};
pub use classify::{classify, classify_sample, classify_with_params, Category};
pub use crossings::{count_peaks, crossing_span};
pub use diffraction::{Confidence, DiffractionModel, LossEstimate, ReliefParameter};
pub use error::{Fault, GeometryFault, NumericFault};
pub use params::ObstructionParams;
pub use processor::{
    compute_link_clearance, evaluate, evaluate_with_params, CategoryCounts, Evaluation,
};
pub use segment::{covers, merge, merge_segments, merge_with_gap, runs, Segment, DEFAULT_MAX_GAP};
pub use tangent::{
    chord_height, find_tangent_envelope, fit_obstacle, ObstacleFit, TangentLine, TowerSide,
};
