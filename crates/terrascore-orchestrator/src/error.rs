//! Error types for batch runs

use terrascore_collector::CollectorError;
use terrascore_store::StoreError;
use thiserror::Error;

/// Errors that abort a batch before or after its tasks run
///
/// Failures inside a task never surface here; they are recorded as that task's
/// status instead.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The imagery client could not be created at startup
    #[error("Imagery service initialization failed: {0}")]
    Authentication(String),

    /// Invalid request or configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Boundary dataset or collector setup failed
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Writing the report failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report could not be encoded
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A worker could not be joined
    #[error("Worker failed: {0}")]
    Worker(String),
}
