//! YAML link descriptions.
//!
//! ```yaml
//! name: hill-hop
//! path_length_m: 10000
//! frequency_mhz: 6000
//! sender: { height_m: 30, above_ground: true }
//! receiver: { height_m: 25, above_ground: true }
//! elevations: [120, 131, 150, 149, 127]
//! params:
//!   max_gap: 2
//! ```

use crate::RunnerError;
use rrl_obstruction::{
    classify_with_params, compute_link_clearance, evaluate_with_params, merge_with_gap, Category,
    Evaluation, ObstructionParams, Segment,
};
use rrl_profile::{wavelength_from_mhz, AntennaHeight, TerrainProfile, TowerPair};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// One antenna of the link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntennaConfig {
    /// Antenna height (meters).
    pub height_m: f64,
    /// Height is measured from the ground at the link end instead of from
    /// the elevation datum.
    #[serde(default)]
    pub above_ground: bool,
}

impl From<AntennaConfig> for AntennaHeight {
    fn from(antenna: AntennaConfig) -> Self {
        if antenna.above_ground {
            AntennaHeight::AboveGround(antenna.height_m)
        } else {
            AntennaHeight::Absolute(antenna.height_m)
        }
    }
}

/// A link to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub path_length_m: f64,
    #[serde(default)]
    pub frequency_mhz: Option<f64>,
    /// Takes precedence over `frequency_mhz` when both are given.
    #[serde(default)]
    pub wavelength_m: Option<f64>,
    pub sender: AntennaConfig,
    pub receiver: AntennaConfig,
    pub elevations: Vec<f64>,
    #[serde(default)]
    pub params: Option<ObstructionParams>,
}

/// Per-sample categories and merged segments, without loss estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub categories: Vec<Category>,
    pub segments: Vec<Segment>,
}

impl LinkConfig {
    /// Parse a link description from YAML. Embedded parameters are validated.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RunnerError> {
        let link: Self = serde_yaml::from_str(yaml)?;
        if let Some(params) = &link.params {
            params.validate()?;
        }
        Ok(link)
    }

    /// Load a link description from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading link description");
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Carrier wavelength in meters.
    pub fn wavelength_m(&self) -> Result<f64, RunnerError> {
        match (self.wavelength_m, self.frequency_mhz) {
            (Some(wavelength), Some(freq)) => {
                warn!(wavelength, freq, "both wavelength and frequency given, using wavelength");
                Ok(wavelength)
            }
            (Some(wavelength), None) => Ok(wavelength),
            (None, Some(freq)) => Ok(wavelength_from_mhz(freq)?),
            (None, None) => Err(RunnerError::MissingWavelength),
        }
    }

    pub fn profile(&self) -> Result<TerrainProfile, RunnerError> {
        Ok(TerrainProfile::from_elevations(
            self.path_length_m,
            &self.elevations,
        )?)
    }

    /// Absolute tower heights, resolving above-ground heights against the
    /// profile end samples.
    pub fn towers(&self, profile: &TerrainProfile) -> Result<TowerPair, RunnerError> {
        Ok(TowerPair::from_antennas(
            profile,
            self.sender.into(),
            self.receiver.into(),
        )?)
    }

    /// Parameters to use: `overrides` if given, else the link's own, else defaults.
    pub fn resolve_params(&self, overrides: Option<&ObstructionParams>) -> ObstructionParams {
        overrides
            .or(self.params.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// Run the full evaluation.
    pub fn evaluate(&self, overrides: Option<&ObstructionParams>) -> Result<Evaluation, RunnerError> {
        let profile = self.profile()?;
        let towers = self.towers(&profile)?;
        let params = self.resolve_params(overrides);
        Ok(evaluate_with_params(
            &profile,
            &towers,
            self.wavelength_m()?,
            &params,
        )?)
    }

    /// Classify and merge without estimating losses.
    pub fn classify(
        &self,
        overrides: Option<&ObstructionParams>,
    ) -> Result<Classification, RunnerError> {
        let profile = self.profile()?;
        let towers = self.towers(&profile)?;
        let params = self.resolve_params(overrides);
        let series = compute_link_clearance(&profile, &towers, self.wavelength_m()?, &params)?;
        let categories = classify_with_params(&series, &params)?;
        let segments = merge_with_gap(&categories, params.max_gap)?;
        Ok(Classification {
            categories,
            segments,
        })
    }
}

/// Load obstruction parameters from a YAML file. Missing fields keep their defaults.
pub fn load_params(path: impl AsRef<Path>) -> Result<ObstructionParams, RunnerError> {
    let contents = std::fs::read_to_string(path)?;
    let params: ObstructionParams = serde_yaml::from_str(&contents)?;
    params.validate()?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rrl_profile::DataError;

    const LINK: &str = r#"
path_length_m: 500
frequency_mhz: 6000
sender: { height_m: 20, above_ground: true }
receiver: { height_m: 130 }
elevations: [100, 104, 110, 106, 101]
"#;

    #[test]
    fn test_parse_minimal_link() {
        let link = LinkConfig::from_yaml_str(LINK).unwrap();
        assert_eq!(link.name, None);
        assert_eq!(link.elevations.len(), 5);
        assert!(link.sender.above_ground);
        assert!(!link.receiver.above_ground);
        assert!(link.params.is_none());
    }

    #[test]
    fn test_towers_resolve_above_ground() {
        let link = LinkConfig::from_yaml_str(LINK).unwrap();
        let profile = link.profile().unwrap();
        let towers = link.towers(&profile).unwrap();
        assert_relative_eq!(towers.sender.height_m, 120.0);
        assert_relative_eq!(towers.receiver.height_m, 130.0);
    }

    #[test]
    fn test_antenna_config_maps_to_reference_level() {
        let link = LinkConfig::from_yaml_str(LINK).unwrap();
        assert_eq!(
            AntennaHeight::from(link.sender),
            AntennaHeight::AboveGround(20.0)
        );
        assert_eq!(
            AntennaHeight::from(link.receiver),
            AntennaHeight::Absolute(130.0)
        );
    }

    #[test]
    fn test_embedded_zero_sphere_scale_is_rejected() {
        let yaml = format!("{LINK}params:\n  sphere_radius_scale: 0.0\n");
        assert!(matches!(
            LinkConfig::from_yaml_str(&yaml),
            Err(RunnerError::DataError(DataError::InvalidParameter {
                name: "sphere_radius_scale",
                ..
            }))
        ));
    }

    #[test]
    fn test_classify_honours_refraction() {
        let yaml = format!("{LINK}params:\n  refraction_k_factor: 1.3333333333333333\n");
        let link = LinkConfig::from_yaml_str(&yaml).unwrap();
        let classification = link.classify(None).unwrap();
        let evaluation = link.evaluate(None).unwrap();
        assert_eq!(classification.categories, evaluation.categories);
    }

    #[test]
    fn test_wavelength_from_frequency() {
        let link = LinkConfig::from_yaml_str(LINK).unwrap();
        assert_relative_eq!(link.wavelength_m().unwrap(), 0.049965, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_wavelength() {
        let mut link = LinkConfig::from_yaml_str(LINK).unwrap();
        link.frequency_mhz = None;
        assert!(matches!(link.wavelength_m(), Err(RunnerError::MissingWavelength)));
    }

    #[test]
    fn test_partial_params_keep_defaults() {
        let yaml = format!("{LINK}params:\n  max_gap: 5\n");
        let link = LinkConfig::from_yaml_str(&yaml).unwrap();
        let params = link.resolve_params(None);
        assert_eq!(params.max_gap, 5);
        assert_eq!(params.parallel_threshold, 8);

        let overrides = ObstructionParams::default();
        assert_eq!(link.resolve_params(Some(&overrides)).max_gap, 3);
    }
}
