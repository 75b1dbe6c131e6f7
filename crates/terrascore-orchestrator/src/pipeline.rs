//! Collect, process and store for a single task

use crate::task::{Task, TaskResult, TaskStatus};
use crate::interval::DateWindow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terrascore_collector::{CollectorConfig, GeoJsonBoundaries, ImageryCollector};
use terrascore_domain::traits::{BoundarySource, ImageryService, TimeSeriesStore};
use terrascore_domain::{CollectionMetadata, Timestamp};
use terrascore_processor::{MetricsProcessor, MetricsRecord};
use terrascore_store::FileStore;
use tracing::{debug, warn};

/// Suffix of the sample file inside a raw collection directory
pub const SAMPLE_FILE_SUFFIX: &str = "_samples.geojson";

/// Which steps a task runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Collect, process and store
    Full,
    /// Collect only; raw files are left for a later `process` run
    CollectOnly,
}

/// Timestamp a stored snapshot is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Midpoint of the task's window (historical backfill)
    IntervalMidpoint,
    /// The collection run's own timestamp
    CollectionTime,
}

/// Shared, read-only components of a batch
///
/// Each worker wraps its own imagery client in a collector built by
/// [`collector`](Self::collector); everything else is shared.
pub struct Pipeline {
    collector_config: CollectorConfig,
    boundaries: Arc<dyn BoundarySource>,
    processor: MetricsProcessor,
    store: Arc<FileStore>,
}

impl Pipeline {
    /// Assemble a pipeline
    pub fn new(
        collector_config: CollectorConfig,
        boundaries: Arc<dyn BoundarySource>,
        processor: MetricsProcessor,
        store: Arc<FileStore>,
    ) -> Self {
        Self {
            collector_config,
            boundaries,
            processor,
            store,
        }
    }

    /// A pipeline that only scores and stores raw collections already on disk
    ///
    /// It has no county boundaries, so any collection attempt ends in
    /// `CountyNotFound`.
    pub fn processing_only(processor: MetricsProcessor, store: Arc<FileStore>) -> Self {
        Self::new(
            CollectorConfig::default(),
            Arc::new(GeoJsonBoundaries::from_counties(Vec::new())),
            processor,
            store,
        )
    }

    /// County boundaries
    pub fn boundaries(&self) -> &dyn BoundarySource {
        self.boundaries.as_ref()
    }

    /// The time-series store
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Directory raw collections are written to
    pub fn raw_dir(&self) -> &Path {
        &self.collector_config.raw_dir
    }

    /// A collector around one imagery client
    pub fn collector(&self, service: Box<dyn ImageryService>) -> ImageryCollector {
        ImageryCollector::new(
            self.collector_config.clone(),
            Arc::clone(&self.boundaries),
            service,
        )
    }

    /// Run one task end to end and classify the outcome
    pub fn run_task(
        &self,
        collector: &ImageryCollector,
        task: &Task,
        mode: PipelineMode,
        policy: TimestampPolicy,
    ) -> TaskResult {
        let handle =
            match collector.collect(&task.county_fips, task.window.start, task.window.end) {
                Ok(Some(handle)) => handle,
                Ok(None) => return TaskResult::new(task, TaskStatus::NoData, None),
                Err(e) => return TaskResult::failed(task, TaskStatus::Error, e),
            };

        if mode == PipelineMode::CollectOnly {
            return TaskResult::success(task, None);
        }

        let record = match self.processor.process(&handle.samples, &handle.metadata) {
            Ok(Some(record)) => record,
            Ok(None) => return TaskResult::new(task, TaskStatus::ProcessingFailed, None),
            Err(e) => return TaskResult::failed(task, TaskStatus::ProcessingFailed, e),
        };

        self.persist(task, &record, policy)
    }

    /// Score and store a raw collection already on disk
    ///
    /// The window is read from the `metadata.json` next to the sample file; `None`
    /// when that metadata is unreadable.
    pub fn process_existing(&self, sample_path: &Path, index: usize) -> Option<TaskResult> {
        let metadata_path = sample_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("metadata.json");
        let metadata = match read_metadata(&metadata_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %metadata_path.display(), error = %e, "Skipping raw collection");
                return None;
            }
        };

        let task = Task {
            index,
            county_fips: metadata.county_fips.clone(),
            window: DateWindow::new(metadata.start_date, metadata.end_date),
        };
        debug!(sample_path = %sample_path.display(), "Processing existing samples");

        let result = match self.processor.process_file(sample_path, Some(&metadata_path)) {
            Ok(Some(record)) => self.persist(&task, &record, TimestampPolicy::CollectionTime),
            Ok(None) => TaskResult::new(&task, TaskStatus::ProcessingFailed, None),
            Err(e) => TaskResult::failed(&task, TaskStatus::ProcessingFailed, e),
        };
        Some(result)
    }

    fn persist(&self, task: &Task, record: &MetricsRecord, policy: TimestampPolicy) -> TaskResult {
        let timestamp = match policy {
            TimestampPolicy::IntervalMidpoint => Timestamp::new(task.window.midpoint()).to_string(),
            TimestampPolicy::CollectionTime => record.collection_date.clone(),
        };

        match self.store.add_data_point(
            &record.county_fips,
            &timestamp,
            record.metrics,
            record.snapshot_metadata(),
        ) {
            Ok(_) => TaskResult::success(task, Some(record.metrics)),
            Err(e) => TaskResult::failed(task, TaskStatus::StorageFailed, e),
        }
    }
}

fn read_metadata(path: &Path) -> Result<CollectionMetadata, String> {
    let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}

/// Sample files of every raw collection directory under `raw_dir`, sorted
pub fn find_sample_files(raw_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(raw_dir)? {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }
        for file in fs::read_dir(&dir)? {
            let path = file?.path();
            let is_sample = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(SAMPLE_FILE_SUFFIX));
            if is_sample {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
