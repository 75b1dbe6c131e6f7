//! Configuration for the Imagery Collector and the HTTP imagery client

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default band list: blue, green, red, red edge 3, NIR, SWIR 1
pub const DEFAULT_BANDS: [&str; 6] = ["B2", "B3", "B4", "B7", "B8", "B11"];

/// Configuration for the Imagery Collector
///
/// # Examples
///
/// ```
/// use terrascore_collector::CollectorConfig;
///
/// let config = CollectorConfig::default();
/// assert_eq!(config.max_scenes, 10);
/// assert_eq!(config.buffer_radius_m, 10_000.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// County boundary dataset (GeoJSON FeatureCollection)
    pub boundaries_path: PathBuf,

    /// Root of the raw output tree
    pub raw_dir: PathBuf,

    /// Simplification tolerance in degrees (~100 m at the default)
    pub simplify_tolerance_deg: f64,

    /// Radius of each sampling region in meters
    pub buffer_radius_m: f64,

    /// Grid points per side; 1 samples around the centroid only
    pub sample_grid: usize,

    /// Sample points generated inside each region
    pub points_per_region: usize,

    /// Seed for sample point placement
    pub sample_seed: u64,

    /// Scenes above this cloudy-pixel percentage are discarded
    pub max_cloud_pct: f64,

    /// Scenes kept after sorting by cloud cover
    pub max_scenes: usize,

    /// Pixels with cloud probability at or above this are masked
    pub cloud_probability_threshold: f64,

    /// Divisor turning raw digital numbers into reflectance
    pub reflectance_scale: f64,

    /// Bands requested from the imagery service
    pub bands: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            boundaries_path: PathBuf::from("data/boundaries/us_counties.geojson"),
            raw_dir: PathBuf::from("data/raw"),
            simplify_tolerance_deg: 0.001,
            buffer_radius_m: 10_000.0,
            sample_grid: 1,
            points_per_region: 500,
            sample_seed: 42,
            max_cloud_pct: 30.0,
            max_scenes: 10,
            cloud_probability_threshold: 50.0,
            reflectance_scale: 10_000.0,
            bands: DEFAULT_BANDS.iter().map(|b| b.to_string()).collect(),
        }
    }
}

impl CollectorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_scenes == 0 {
            return Err("max_scenes must be greater than 0".to_string());
        }
        if self.points_per_region == 0 {
            return Err("points_per_region must be greater than 0".to_string());
        }
        if self.sample_grid == 0 {
            return Err("sample_grid must be at least 1".to_string());
        }
        if !self.buffer_radius_m.is_finite() || self.buffer_radius_m <= 0.0 {
            return Err("buffer_radius_m must be positive".to_string());
        }
        if !self.reflectance_scale.is_finite() || self.reflectance_scale <= 0.0 {
            return Err("reflectance_scale must be positive".to_string());
        }
        if self.simplify_tolerance_deg < 0.0 {
            return Err("simplify_tolerance_deg cannot be negative".to_string());
        }
        if !(0.0..=100.0).contains(&self.max_cloud_pct) {
            return Err("max_cloud_pct must be within [0, 100]".to_string());
        }
        if self.bands.is_empty() {
            return Err("bands cannot be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

/// Connection settings for the HTTP imagery service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageryConfig {
    /// Base URL of the service
    pub endpoint: String,

    /// Request timeout; absent means requests may block indefinitely
    pub timeout_secs: Option<u64>,

    /// Credentials file
    pub credentials_path: Option<PathBuf>,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8600".to_string(),
            timeout_secs: None,
            credentials_path: None,
        }
    }
}

impl ImageryConfig {
    /// Request timeout as a Duration, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
