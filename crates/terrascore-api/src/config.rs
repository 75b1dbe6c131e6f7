//! Configuration file parsing for the API servers.
//!
//! Both servers read the `[api]` and `[storage]` sections of the shared terrascore
//! configuration file; every key has a default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use terrascore_query::QueryConfig;
use thiserror::Error;

/// API configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Port of the query API
    pub bind_port: u16,

    /// Port of the dashboard server
    pub dashboard_port: u16,

    /// Snapshots further than this from a requested date are ignored
    pub nearest_window_days: i64,

    /// Window length when only one time-series bound is given
    pub default_lookback_days: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8001,
            dashboard_port: 5000,
            nearest_window_days: 30,
            default_lookback_days: 365,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    time_series_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    storage: StorageSection,
}

/// Everything a server needs to start
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP settings
    pub api: ApiConfig,
    /// Directory of per-county time-series records
    pub time_series_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            time_series_dir: PathBuf::from("data/processed/time_series"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        let config = Self {
            api: file.api,
            time_series_dir: file
                .storage
                .time_series_dir
                .unwrap_or_else(|| ServerConfig::default().time_series_dir),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.query_config()
            .validate()
            .map_err(ConfigError::Invalid)
    }

    /// Full bind address of the query API (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.bind_address, self.api.bind_port)
    }

    /// Full bind address of the dashboard (address:port)
    pub fn dashboard_addr(&self) -> String {
        format!("{}:{}", self.api.bind_address, self.api.dashboard_port)
    }

    /// Settings for the shared query layer
    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            nearest_window_days: self.api.nearest_window_days,
            default_lookback_days: self.api.default_lookback_days,
        }
    }
}
