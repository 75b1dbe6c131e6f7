//! Terrascore Imagery Collector
//!
//! Produces a representative [`SampleSet`](terrascore_domain::SampleSet) for a county
//! and date range from an external imagery service.
//!
//! # Pipeline
//!
//! 1. Look up the county boundary ([`GeoJsonBoundaries`])
//! 2. Simplify it and reduce the query to buffered regions around the centroid (or a
//!    small grid of points) with deterministic sample points
//! 3. Query the [`ImageryService`](terrascore_domain::traits::ImageryService), keeping
//!    the clearest scenes under the cloud-cover threshold
//! 4. Mask clouds, derive spectral indices per scene and take the per-point median
//! 5. Write `{county_fips}_samples.geojson` and `metadata.json` under a timestamped
//!    directory
//!
//! No scenes means no data: [`ImageryCollector::collect`] returns `Ok(None)` and
//! nothing is fabricated.

#![warn(missing_docs)]

pub mod boundaries;
pub mod collector;
pub mod composite;
pub mod config;
pub mod error;
pub mod geometry;
pub mod http;
pub mod indices;
pub mod mock;

pub use boundaries::GeoJsonBoundaries;
pub use collector::{ImageryCollector, SampleSetHandle};
pub use config::{CollectorConfig, ImageryConfig};
pub use error::CollectorError;
pub use http::{HttpImageryFactory, HttpImageryService};
pub use mock::{MockImageryFactory, MockImageryService};
