//! Terrascore Domain Layer
//!
//! Core value types and trait seams shared by every other terrascore crate.
//!
//! ## Key Concepts
//!
//! - **County**: immutable reference entity keyed by its FIPS code
//! - **SampleSet**: spectral index samples for one (county, date range) request
//! - **MetricSnapshot**: obsolescence / growth potential / bivariate scores at a timestamp
//! - **CountyTimeSeries**: the ordered snapshots recorded for one county
//!
//! ## Architecture
//!
//! Infrastructure lives elsewhere. This crate only defines the vocabulary and the
//! traits that the collector, store and query layers implement or consume:
//! [`traits::ImageryService`], [`traits::ImageryServiceFactory`],
//! [`traits::BoundarySource`] and [`traits::TimeSeriesStore`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod county;
pub mod imagery;
pub mod index;
pub mod sample;
pub mod snapshot;
pub mod timestamp;
pub mod traits;

// Re-exports for convenience
pub use collection::CollectionMetadata;
pub use county::County;
pub use imagery::{ImageryError, ImageryQuery, PixelObservation, Scene};
pub use index::SpectralIndex;
pub use sample::{IndexSample, SampleSet};
pub use snapshot::{CountyTimeSeries, MetricName, MetricSnapshot, ScoreSet, SnapshotMetadata};
pub use timestamp::{Timestamp, TimestampError};
