use rrl_profile::DataError;
use thiserror::Error;

/// Errors that can occur while loading, evaluating or reporting a link.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid link data: {0}")]
    DataError(#[from] DataError),

    #[error("Link description needs either `frequency_mhz` or `wavelength_m`")]
    MissingWavelength,
}
