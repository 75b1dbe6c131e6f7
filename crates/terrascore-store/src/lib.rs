//! Terrascore Storage Layer
//!
//! Implements the TimeSeriesStore trait on top of one JSON record per county.
//!
//! # Architecture
//!
//! - Record path: `{dir}/{county_fips}_time_series.json`
//! - Writes hold a per-county lock for the whole read-modify-write cycle, so two
//!   writers appending to the same county in this process cannot drop each other's
//!   snapshot
//! - Records are written to a temporary file in the same directory and renamed over
//!   the old record, so readers see either the old or the new record, never a
//!   partial one
//!
//! # Examples
//!
//! ```no_run
//! use terrascore_domain::traits::TimeSeriesStore;
//! use terrascore_domain::{ScoreSet, SnapshotMetadata};
//! use terrascore_store::FileStore;
//!
//! let store = FileStore::new("data/processed/time_series").unwrap();
//! store
//!     .add_data_point("06037", "2023-06-15", ScoreSet::new(Some(0.62), Some(0.41)), SnapshotMetadata::default())
//!     .unwrap();
//! ```

#![warn(missing_docs)]

pub mod export;

pub use export::SeriesTable;

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use terrascore_domain::traits::TimeSeriesStore;
use terrascore_domain::{
    CountyTimeSeries, MetricSnapshot, ScoreSet, SnapshotMetadata, Timestamp, TimestampError,
};
use thiserror::Error;
use tracing::{info, warn};

/// Suffix shared by every per-county record file
pub const RECORD_SUFFIX: &str = "_time_series.json";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing a record failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timestamp or timeframe bound could not be parsed
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    /// County key is not usable as a record name
    #[error("Invalid county key: {0:?}")]
    InvalidKey(String),

    /// Ingested file is missing a required field
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A writer panicked while holding a county lock
    #[error("County lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<tempfile::PersistError> for StoreError {
    fn from(e: tempfile::PersistError) -> Self {
        StoreError::Io(e.error)
    }
}

/// Shape of a processor metrics record, as ingested by
/// [`FileStore::store_processed_metrics`]
#[derive(Debug, Deserialize)]
struct ProcessedMetricsFile {
    county_fips: Option<String>,
    county_name: Option<String>,
    state_fips: Option<String>,
    collection_date: Option<String>,
    #[serde(default)]
    metrics: ScoreSet,
    #[serde(default)]
    metadata: SnapshotMetadata,
}

/// File-backed implementation of TimeSeriesStore
///
/// # Thread Safety
///
/// `FileStore` is `Sync`; share it behind an `Arc`. Appends to the same county are
/// serialized, appends to different counties proceed in parallel. Separate processes
/// writing the same directory are not coordinated.
pub struct FileStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a county's record
    pub fn record_path(&self, county_fips: &str) -> PathBuf {
        self.dir.join(format!("{}{}", county_fips, RECORD_SUFFIX))
    }

    /// Reject keys that would escape the store directory
    fn validate_key(county_fips: &str) -> Result<(), StoreError> {
        let bad = county_fips.is_empty()
            || county_fips
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '\0')
            || county_fips.starts_with('.');
        if bad {
            return Err(StoreError::InvalidKey(county_fips.to_string()));
        }
        Ok(())
    }

    /// Lock guarding a county's read-modify-write cycle
    fn county_lock(&self, county_fips: &str) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::LockPoisoned("lock table".to_string()))?;
        Ok(locks
            .entry(county_fips.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Read a county's record, `None` if it does not exist
    fn read_record(&self, county_fips: &str) -> Result<Option<CountyTimeSeries>, StoreError> {
        let path = self.record_path(county_fips);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let series: CountyTimeSeries = serde_json::from_str(&contents)?;
        Ok(Some(series))
    }

    /// Replace a county's record atomically
    fn write_record(&self, series: &CountyTimeSeries) -> Result<(), StoreError> {
        let tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, series)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(self.record_path(&series.county_fips))?;
        Ok(())
    }

    /// Normalize a caller-supplied timestamp; blank means "now"
    fn normalize_timestamp(timestamp: &str) -> Result<Timestamp, StoreError> {
        if timestamp.trim().is_empty() {
            return Ok(Timestamp::now());
        }
        Ok(Timestamp::parse(timestamp)?)
    }

    /// Ingest a metrics record file written by the processor
    ///
    /// The record's `collection_date` becomes the snapshot timestamp.
    pub fn store_processed_metrics<P: AsRef<Path>>(
        &self,
        metrics_file: P,
    ) -> Result<MetricSnapshot, StoreError> {
        let contents = fs::read_to_string(metrics_file.as_ref())?;
        let record: ProcessedMetricsFile = serde_json::from_str(&contents)?;

        let county_fips = record.county_fips.ok_or_else(|| {
            StoreError::InvalidData(format!(
                "Missing county_fips in metrics file: {}",
                metrics_file.as_ref().display()
            ))
        })?;
        let timestamp = record.collection_date.unwrap_or_default();

        let mut metadata = record.metadata;
        if metadata.county_name.is_none() {
            metadata.county_name = record.county_name;
        }
        if metadata.state_fips.is_none() {
            metadata.state_fips = record.state_fips;
        }

        self.add_data_point(&county_fips, &timestamp, record.metrics, metadata)
    }

    /// Load every stored series, ordered by county FIPS
    ///
    /// Records that cannot be read are logged and skipped.
    pub fn list_series(&self) -> Result<Vec<CountyTimeSeries>, StoreError> {
        let mut all = Vec::new();
        for county_fips in self.list_counties()? {
            match self.read_record(&county_fips) {
                Ok(Some(series)) => all.push(series),
                Ok(None) => {}
                Err(e) => {
                    warn!(county_fips = %county_fips, error = %e, "Skipping unreadable record");
                }
            }
        }
        Ok(all)
    }

    /// Flatten a county's series into a table
    pub fn export_table(&self, county_fips: &str) -> Result<SeriesTable, StoreError> {
        let series = self.get_time_series(county_fips)?;
        Ok(SeriesTable::from_series(&series))
    }
}

impl TimeSeriesStore for FileStore {
    type Error = StoreError;

    fn add_data_point(
        &self,
        county_fips: &str,
        timestamp: &str,
        metrics: ScoreSet,
        metadata: SnapshotMetadata,
    ) -> Result<MetricSnapshot, Self::Error> {
        Self::validate_key(county_fips)?;
        let timestamp = Self::normalize_timestamp(timestamp)?;

        let snapshot = MetricSnapshot {
            timestamp,
            metrics,
            metadata,
        };

        let lock = self.county_lock(county_fips)?;
        let _guard = lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned(county_fips.to_string()))?;

        let mut series = self
            .read_record(county_fips)?
            .unwrap_or_else(|| CountyTimeSeries::empty(county_fips));
        series.append(snapshot.clone());
        self.write_record(&series)?;

        info!(county_fips = %county_fips, timestamp = %timestamp, "Added data point");
        Ok(snapshot)
    }

    fn get_time_series(&self, county_fips: &str) -> Result<CountyTimeSeries, Self::Error> {
        Self::validate_key(county_fips)?;
        match self.read_record(county_fips)? {
            Some(series) => Ok(series),
            None => {
                warn!(county_fips = %county_fips, "No time series data found");
                Ok(CountyTimeSeries::empty(county_fips))
            }
        }
    }

    fn get_latest_data_point(
        &self,
        county_fips: &str,
    ) -> Result<Option<MetricSnapshot>, Self::Error> {
        let series = self.get_time_series(county_fips)?;
        Ok(series.latest().cloned())
    }

    fn get_data_for_timeframe(
        &self,
        county_fips: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<MetricSnapshot>, Self::Error> {
        let start = Timestamp::parse(start)?;
        let end = Timestamp::parse(end)?;
        let series = self.get_time_series(county_fips)?;
        Ok(series.within(start, end))
    }

    fn has_record(&self, county_fips: &str) -> bool {
        Self::validate_key(county_fips).is_ok() && self.record_path(county_fips).is_file()
    }

    fn list_counties(&self) -> Result<Vec<String>, Self::Error> {
        let mut counties = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(fips) = name.strip_suffix(RECORD_SUFFIX) {
                if !fips.is_empty() {
                    counties.push(fips.to_string());
                }
            }
        }
        counties.sort();
        Ok(counties)
    }
}
