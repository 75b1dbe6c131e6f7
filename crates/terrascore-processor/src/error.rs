//! Error types for the Metrics Processor

use terrascore_domain::SpectralIndex;
use thiserror::Error;

/// Why a sample set could not be scored
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// The sample set has no samples
    #[error("Sample set is empty")]
    EmptySampleSet,

    /// Required index columns are absent, or carry no usable values
    #[error("Missing required indices: {}", format_indices(.0))]
    MissingIndices(Vec<SpectralIndex>),
}

fn format_indices(indices: &[SpectralIndex]) -> String {
    indices
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while processing sample files
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Reading inputs or writing the metrics record failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sample file is not a usable FeatureCollection
    #[error("Invalid sample file: {0}")]
    InvalidSamples(String),
}
