//! Terrascore Query Layer
//!
//! Read-only operations over the time-series store, shared by the HTTP API and the
//! dashboard server so both answer identically.
//!
//! # Operations
//!
//! - [`QueryService::counties`]: one summary per stored county
//! - [`QueryService::time_series`]: full or date-filtered series
//! - [`QueryService::latest`]: most recent snapshot and point count
//! - [`QueryService::metrics_near`]: every county's value of one metric closest to a date

#![warn(missing_docs)]

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use terrascore_domain::traits::TimeSeriesStore;
use terrascore_domain::{CountyTimeSeries, MetricName, MetricSnapshot, Timestamp};
use terrascore_store::{FileStore, StoreError};
use thiserror::Error;
use tracing::debug;

/// Errors returned by query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// The county has no stored data
    #[error("No data found for county {0}")]
    NotFound(String),

    /// A query parameter is malformed
    #[error("{0}")]
    BadRequest(String),

    /// The store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Tunables for the query layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// A snapshot further than this from the requested date is ignored by
    /// [`QueryService::metrics_near`]
    pub nearest_window_days: i64,
    /// Window length used when only one time-series bound is supplied
    pub default_lookback_days: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            nearest_window_days: 30,
            default_lookback_days: 365,
        }
    }
}

impl QueryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.nearest_window_days < 0 {
            return Err("nearest_window_days cannot be negative".to_string());
        }
        if self.default_lookback_days <= 0 {
            return Err("default_lookback_days must be positive".to_string());
        }
        Ok(())
    }
}

/// One row of the county listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountySummary {
    /// County FIPS code
    pub county_fips: String,
    /// Name from the first snapshot's metadata
    pub county_name: Option<String>,
    /// State from the first snapshot's metadata
    pub state_fips: Option<String>,
    /// Number of snapshots
    pub data_point_count: usize,
    /// Greatest timestamp
    pub latest_timestamp: Option<Timestamp>,
}

/// Latest snapshot of a county
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    /// County FIPS code
    pub county_fips: String,
    /// The snapshot
    pub latest_data: MetricSnapshot,
    /// Number of snapshots in the series
    pub data_point_count: usize,
}

/// One county's value in a cross-county metric lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyMetric {
    /// County FIPS code
    pub county_fips: String,
    /// Timestamp of the snapshot used
    pub timestamp: Timestamp,
    /// Metric name
    pub metric: MetricName,
    /// Metric value
    pub value: f64,
}

/// Result of a cross-county metric lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsAtDate {
    /// Requested date as given
    pub date: String,
    /// Requested metric
    pub metric: MetricName,
    /// Counties with a snapshot within the window
    pub county_metrics: Vec<CountyMetric>,
}

/// Read-only view over a [`FileStore`]
#[derive(Clone)]
pub struct QueryService {
    store: Arc<FileStore>,
    config: QueryConfig,
}

impl QueryService {
    /// Create a query service
    pub fn new(store: Arc<FileStore>, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Summaries of every stored county, ordered by FIPS
    ///
    /// Unreadable records are skipped.
    pub fn counties(&self) -> Result<Vec<CountySummary>, QueryError> {
        let summaries = self
            .store
            .list_series()?
            .into_iter()
            .map(|series| CountySummary {
                county_name: series.county_name().map(str::to_string),
                state_fips: series.state_fips().map(str::to_string),
                data_point_count: series.len(),
                latest_timestamp: series.latest().map(|p| p.timestamp),
                county_fips: series.county_fips,
            })
            .collect();
        Ok(summaries)
    }

    /// A county's series, optionally filtered to `[start, end]`
    ///
    /// With neither bound the full series is returned. With one bound the other
    /// defaults: `end` to now, `start` to `default_lookback_days` before now.
    pub fn time_series(
        &self,
        county_fips: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<CountyTimeSeries, QueryError> {
        let mut series = self.store.get_time_series(county_fips)?;
        if series.is_empty() {
            return Err(QueryError::NotFound(county_fips.to_string()));
        }
        if start.is_none() && end.is_none() {
            return Ok(series);
        }

        let now = Timestamp::now();
        let end = match end {
            Some(raw) => parse_bound("end_date", raw)?,
            None => now,
        };
        let start = match start {
            Some(raw) => parse_bound("start_date", raw)?,
            None => Timestamp::new(
                now.as_naive() - Duration::days(self.config.default_lookback_days),
            ),
        };
        debug!(county_fips = %county_fips, start = %start, end = %end, "Filtering series");

        series.data_points = series.within(start, end);
        Ok(series)
    }

    /// Latest snapshot of a county
    pub fn latest(&self, county_fips: &str) -> Result<LatestSnapshot, QueryError> {
        let series = self.store.get_time_series(county_fips)?;
        let latest = series
            .latest()
            .cloned()
            .ok_or_else(|| QueryError::NotFound(county_fips.to_string()))?;
        Ok(LatestSnapshot {
            county_fips: county_fips.to_string(),
            latest_data: latest,
            data_point_count: series.len(),
        })
    }

    /// For every county, `metric` from the snapshot closest to `date`
    ///
    /// Counties whose closest snapshot is more than `nearest_window_days` away, or
    /// whose value for the metric is null, are left out.
    pub fn metrics_near(&self, date: &str, metric: &str) -> Result<MetricsAtDate, QueryError> {
        let target = Timestamp::parse(date).map_err(|_| {
            QueryError::BadRequest(format!("Invalid date format: {}. Use YYYY-MM-DD.", date))
        })?;
        let metric: MetricName = metric.parse().map_err(QueryError::BadRequest)?;
        let window = Duration::days(self.config.nearest_window_days);

        let county_metrics = self
            .store
            .list_series()?
            .iter()
            .filter_map(|series| {
                let (point, diff) = series.closest_to(target)?;
                if diff > window {
                    return None;
                }
                Some(CountyMetric {
                    county_fips: series.county_fips.clone(),
                    timestamp: point.timestamp,
                    metric,
                    value: point.metrics.get(metric)?,
                })
            })
            .collect();

        Ok(MetricsAtDate {
            date: date.to_string(),
            metric,
            county_metrics,
        })
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<Timestamp, QueryError> {
    Timestamp::parse(raw)
        .map_err(|_| QueryError::BadRequest(format!("Invalid {}: {}", name, raw)))
}
