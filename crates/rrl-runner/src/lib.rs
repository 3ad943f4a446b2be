//! # rrl-runner
//!
//! Loads YAML link descriptions, runs the obstruction analysis and renders
//! the results. The `rrl` binary is a thin clap front end over this crate.

mod config;
mod error;
mod report;

pub use config::{load_params, AntennaConfig, Classification, LinkConfig};
pub use error::RunnerError;
pub use report::{render_classification, render_evaluation, OutputFormat};
