//! Terrascore Metrics Processor
//!
//! Deterministic reduction of a [`SampleSet`](terrascore_domain::SampleSet) to
//! obsolescence, growth potential and bivariate scores.
//!
//! # Scores
//!
//! - **Obsolescence**: 75th percentile over samples of `NDBI − NDVI`, rescaled from
//!   [-1, 1] to [0, 1] and clamped. High built-up with low vegetation scores high.
//! - **Growth potential**: 75th percentile of
//!   `0.4·veg_term + 0.4·built_term + 0.2·water_term`, clamped to [0, 1], where
//!   `veg_term = 1 − 2·|NDVI − 0.5|`, `built_term = 1 − 2·|NDBI − 0.3|` and
//!   `water_term = clamp01(max(NDWI, MNDWI))`.
//! - **Bivariate**: obsolescence × growth potential.
//!
//! Weights, peaks and the percentile come from [`ProcessorConfig`]; the defaults
//! are the values above.
//!
//! # Examples
//!
//! ```
//! use terrascore_domain::{IndexSample, SampleSet, SpectralIndex};
//! use terrascore_processor::{MetricsProcessor, ProcessorConfig};
//!
//! let sample = IndexSample::new(-118.2, 34.0)
//!     .with(SpectralIndex::Ndvi, 0.5)
//!     .with(SpectralIndex::Ndbi, 0.3)
//!     .with(SpectralIndex::Ndwi, 0.0)
//!     .with(SpectralIndex::Mndwi, 0.0)
//!     .with(SpectralIndex::Ui, 0.1);
//! let samples = SampleSet::from_samples(vec![sample]);
//!
//! let processor = MetricsProcessor::new(ProcessorConfig::default());
//! let scores = processor.compute_scores(&samples).unwrap();
//! assert!((scores.growth_potential_score.unwrap() - 0.8).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod processor;
mod record;
pub mod stats;

pub use config::ProcessorConfig;
pub use error::{ProcessorError, ScoreError};
pub use processor::MetricsProcessor;
pub use record::{MetricsRecord, RecordMetadata};
