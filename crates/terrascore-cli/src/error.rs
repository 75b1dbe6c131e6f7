//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Batch could not run
    #[error(transparent)]
    Orchestrator(#[from] terrascore_orchestrator::OrchestratorError),

    /// Boundary dataset could not be loaded
    #[error(transparent)]
    Collector(#[from] terrascore_collector::CollectorError),

    /// Store error
    #[error(transparent)]
    Store(#[from] terrascore_store::StoreError),

    /// Query error
    #[error(transparent)]
    Query(#[from] terrascore_query::QueryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
