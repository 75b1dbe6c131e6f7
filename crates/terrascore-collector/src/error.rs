//! Error types for the Imagery Collector

use terrascore_domain::ImageryError;
use thiserror::Error;

/// Errors that can occur during collection
#[derive(Error, Debug)]
pub enum CollectorError {
    /// FIPS code is not in the boundary dataset
    #[error("County not found: {0}")]
    CountyNotFound(String),

    /// Imagery service rejected the credentials or could not be initialized
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Imagery service failed during a query
    #[error("Imagery service error: {0}")]
    Imagery(String),

    /// Boundary dataset could not be read
    #[error("Invalid boundary dataset: {0}")]
    Boundaries(String),

    /// Raw output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ImageryError> for CollectorError {
    fn from(e: ImageryError) -> Self {
        match e {
            ImageryError::Authentication(msg) => CollectorError::Authentication(msg),
            other => CollectorError::Imagery(other.to_string()),
        }
    }
}
