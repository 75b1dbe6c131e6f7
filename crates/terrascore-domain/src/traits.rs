//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    County, CountyTimeSeries, ImageryError, ImageryQuery, MetricSnapshot, Scene, ScoreSet,
    SnapshotMetadata,
};

/// Source of imagery scenes
///
/// Implemented by the infrastructure layer (terrascore-collector). Calls block the
/// calling thread.
pub trait ImageryService: Send {
    /// Scenes intersecting the query region and window, filtered by cloud cover
    fn query(&self, query: &ImageryQuery) -> Result<Vec<Scene>, ImageryError>;
}

/// Builds one [`ImageryService`] per worker
///
/// Workers call `create` once when they start and reuse the client for every task
/// they run.
pub trait ImageryServiceFactory: Send + Sync {
    /// Construct and initialize a client
    fn create(&self) -> Result<Box<dyn ImageryService>, ImageryError>;
}

/// Read-only county boundary lookup
pub trait BoundarySource: Send + Sync {
    /// County for a FIPS code
    fn county(&self, fips: &str) -> Option<County>;

    /// Every FIPS code in the dataset
    fn all_fips(&self) -> Vec<String>;

    /// FIPS codes of every county in a state
    fn fips_in_state(&self, state_fips: &str) -> Vec<String>;
}

/// Durable per-county append-only series of metric snapshots
///
/// Implemented by the infrastructure layer (terrascore-store). Methods take `&self`
/// so one store can be shared by concurrent writers; implementations serialize
/// writes to the same county.
pub trait TimeSeriesStore: Send + Sync {
    /// Error type for store operations
    type Error;

    /// Append a snapshot to a county's series
    ///
    /// `timestamp` may be ISO-8601, `YYYYMMDD_HHMMSS` or `YYYY-MM-DD`. Returns the
    /// snapshot as stored.
    fn add_data_point(
        &self,
        county_fips: &str,
        timestamp: &str,
        metrics: ScoreSet,
        metadata: SnapshotMetadata,
    ) -> Result<MetricSnapshot, Self::Error>;

    /// Complete series; empty when the county has no record
    fn get_time_series(&self, county_fips: &str) -> Result<CountyTimeSeries, Self::Error>;

    /// Most recent snapshot, `None` when there is none
    fn get_latest_data_point(&self, county_fips: &str)
        -> Result<Option<MetricSnapshot>, Self::Error>;

    /// Snapshots with `start <= timestamp <= end`
    fn get_data_for_timeframe(
        &self,
        county_fips: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<MetricSnapshot>, Self::Error>;

    /// Whether a durable record exists for the county
    fn has_record(&self, county_fips: &str) -> bool;

    /// FIPS codes of every stored record
    fn list_counties(&self) -> Result<Vec<String>, Self::Error>;
}
