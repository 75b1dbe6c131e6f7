//! Configuration for the Metrics Processor

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use terrascore_domain::SpectralIndex;

/// Configuration for the Metrics Processor
///
/// The defaults reproduce the published score formulas exactly.
///
/// # Examples
///
/// ```
/// use terrascore_processor::ProcessorConfig;
///
/// let config = ProcessorConfig::default();
/// assert_eq!(config.percentile, 75.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Index columns a sample set must carry to be scored
    pub required_indices: Vec<SpectralIndex>,

    /// Percentile taken over per-sample values, [0, 100]
    /// Default: 75
    pub percentile: f64,

    /// Weight of the vegetation term in the growth score
    pub vegetation_weight: f64,

    /// Weight of the built-up term in the growth score
    pub built_weight: f64,

    /// Weight of the water term in the growth score
    pub water_weight: f64,

    /// NDVI at which the vegetation term peaks
    pub vegetation_peak: f64,

    /// NDBI at which the built-up term peaks
    pub built_peak: f64,

    /// Where metrics records are written
    pub processed_dir: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            required_indices: vec![
                SpectralIndex::Ndvi,
                SpectralIndex::Ndbi,
                SpectralIndex::Ndwi,
                SpectralIndex::Mndwi,
                SpectralIndex::Ui,
            ],
            percentile: 75.0,
            vegetation_weight: 0.4,
            built_weight: 0.4,
            water_weight: 0.2,
            vegetation_peak: 0.5,
            built_peak: 0.3,
            processed_dir: PathBuf::from("data/processed"),
        }
    }
}

impl ProcessorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(format!(
                "percentile must be within [0, 100], got {}",
                self.percentile
            ));
        }
        for (name, weight) in [
            ("vegetation_weight", self.vegetation_weight),
            ("built_weight", self.built_weight),
            ("water_weight", self.water_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{} must be a non-negative number", name));
            }
        }
        if !self.vegetation_peak.is_finite() || !self.built_peak.is_finite() {
            return Err("vegetation_peak and built_peak must be finite".to_string());
        }
        Ok(())
    }

    /// Builder-style output directory override
    pub fn with_processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.processed_dir = dir.into();
        self
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
