//! Configuration management for the CLI.
//!
//! One TOML file, one section per component. Every key has a default, and a missing
//! file at the default location means "all defaults".

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use terrascore_collector::{CollectorConfig, ImageryConfig};
use terrascore_orchestrator::OrchestratorConfig;
use terrascore_processor::ProcessorConfig;
use terrascore_query::QueryConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directories
    #[serde(default)]
    pub storage: StorageSettings,

    /// Sampling and compositing
    #[serde(default)]
    pub collector: CollectorConfig,

    /// External imagery service
    #[serde(default)]
    pub imagery: ImageryConfig,

    /// Scoring
    #[serde(default)]
    pub processor: ProcessorConfig,

    /// Batch scheduling
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Query windows; the `[api]` section shared with the API servers
    #[serde(default)]
    pub api: QueryConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Data directories.
///
/// `raw_dir` and `processed_dir`, when set, override the collector's and
/// processor's own settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Per-county time-series records
    #[serde(default = "default_time_series_dir")]
    pub time_series_dir: PathBuf,

    /// Raw collections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_dir: Option<PathBuf>,

    /// Metrics records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_dir: Option<PathBuf>,

    /// Batch summaries
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".terrascore").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `~/.terrascore/config.toml` is used
    /// if present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.collector.validate().map_err(CliError::Config)?;
        self.processor.validate().map_err(CliError::Config)?;
        self.orchestrator.validate().map_err(CliError::Config)?;
        self.api.validate().map_err(CliError::Config)?;
        Ok(())
    }

    /// Collector settings with the storage override applied.
    pub fn collector_config(&self) -> CollectorConfig {
        let mut config = self.collector.clone();
        if let Some(raw_dir) = &self.storage.raw_dir {
            config.raw_dir = raw_dir.clone();
        }
        config
    }

    /// Processor settings with the storage override applied.
    pub fn processor_config(&self) -> ProcessorConfig {
        match &self.storage.processed_dir {
            Some(dir) => self.processor.clone().with_processed_dir(dir.clone()),
            None => self.processor.clone(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            time_series_dir: default_time_series_dir(),
            raw_dir: None,
            processed_dir: None,
            reports_dir: default_reports_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_time_series_dir() -> PathBuf {
    PathBuf::from("data/processed/time_series")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("data/reports")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
