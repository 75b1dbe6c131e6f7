//! Terrascore Orchestrator
//!
//! Fans the collect → process → store pipeline out over counties and date windows.
//!
//! ## Operations
//!
//! - [`Orchestrator::run_historical`]: partition a date range into sub-intervals and
//!   run every (county, interval) pair, filing each snapshot at its interval midpoint
//! - [`Orchestrator::run_collect`]: one window per county, filed at collection time
//! - [`Orchestrator::process_raw`] / [`process_raw`]: score and store raw collections
//!   already on disk
//!
//! Every task ends in exactly one [`TaskStatus`]; no task failure aborts a batch.
//! Only a failure to create the imagery client before any task runs is fatal.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod interval;
pub mod pipeline;
pub mod runner;
pub mod selection;
pub mod summary;
pub mod task;

pub use config::OrchestratorConfig;
pub use error::OrchestratorError;
pub use interval::{DateWindow, Interval};
pub use pipeline::{Pipeline, PipelineMode, TimestampPolicy};
pub use runner::BatchRunner;
pub use selection::{CountySelection, DEFAULT_COUNTIES};
pub use summary::BatchSummary;
pub use task::{Task, TaskResult, TaskStatus};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use terrascore_domain::traits::ImageryServiceFactory;
use tracing::info;

/// Drives batches over a shared [`Pipeline`]
pub struct Orchestrator {
    pipeline: Arc<Pipeline>,
    factory: Arc<dyn ImageryServiceFactory>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator
    pub fn new(
        pipeline: Pipeline,
        factory: Arc<dyn ImageryServiceFactory>,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        config.validate().map_err(OrchestratorError::Config)?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            factory,
            config,
        })
    }

    /// The shared pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Create one imagery client and drop it
    ///
    /// Run before any task so bad credentials abort the batch up front.
    pub async fn preflight(&self) -> Result<(), OrchestratorError> {
        let factory = Arc::clone(&self.factory);
        tokio::task::spawn_blocking(move || factory.create().map(drop))
            .await
            .map_err(|e| OrchestratorError::Worker(e.to_string()))?
            .map_err(|e| OrchestratorError::Authentication(e.to_string()))
    }

    /// Historical backfill over `[start_date, end_date]`
    pub async fn run_historical(
        &self,
        counties: Vec<String>,
        window: DateWindow,
        interval: Interval,
    ) -> Result<BatchSummary, OrchestratorError> {
        if window.start > window.end {
            return Err(OrchestratorError::Config(format!(
                "start date {} is after end date {}",
                window.start, window.end
            )));
        }
        let windows = interval.partition(window.start, window.end);
        info!(
            counties = counties.len(),
            intervals = windows.len(),
            interval = %interval,
            "Processing historical range {}",
            window
        );

        self.preflight().await?;
        let tasks = Task::cross(&counties, &windows);
        let started = Instant::now();
        let results = self
            .runner()
            .run(tasks, PipelineMode::Full, TimestampPolicy::IntervalMidpoint)
            .await;

        let summary = BatchSummary::new(
            Some(window.start),
            Some(window.end),
            Some(interval),
            counties,
            results,
            started.elapsed(),
        );
        summary.log();
        Ok(summary)
    }

    /// One collection window for every county
    pub async fn run_collect(
        &self,
        counties: Vec<String>,
        window: DateWindow,
        mode: PipelineMode,
    ) -> Result<BatchSummary, OrchestratorError> {
        if window.start > window.end {
            return Err(OrchestratorError::Config(format!(
                "start date {} is after end date {}",
                window.start, window.end
            )));
        }
        info!(counties = counties.len(), mode = ?mode, "Collecting {}", window);

        self.preflight().await?;
        let tasks = Task::cross(&counties, &[window]);
        let started = Instant::now();
        let results = self
            .runner()
            .run(tasks, mode, TimestampPolicy::CollectionTime)
            .await;

        let summary = BatchSummary::new(
            Some(window.start),
            Some(window.end),
            None,
            counties,
            results,
            started.elapsed(),
        );
        summary.log();
        Ok(summary)
    }

    /// Score and store every raw collection under `raw_dir`
    ///
    /// See [`process_raw`].
    pub async fn process_raw(&self, raw_dir: &Path) -> Result<BatchSummary, OrchestratorError> {
        process_raw(Arc::clone(&self.pipeline), raw_dir).await
    }

    fn runner(&self) -> BatchRunner {
        BatchRunner::new(
            Arc::clone(&self.pipeline),
            Arc::clone(&self.factory),
            self.config.clone(),
        )
    }
}

/// Score and store every raw collection under `raw_dir`
///
/// Runs on a single blocking thread. Needs neither an imagery client nor county
/// boundaries, so a [`Pipeline::processing_only`] pipeline is enough.
pub async fn process_raw(
    pipeline: Arc<Pipeline>,
    raw_dir: &Path,
) -> Result<BatchSummary, OrchestratorError> {
    let files = crate::pipeline::find_sample_files(raw_dir)?;
    info!(files = files.len(), raw_dir = %raw_dir.display(), "Processing existing collections");

    let started = Instant::now();
    let results = tokio::task::spawn_blocking(move || {
        files
            .iter()
            .enumerate()
            .filter_map(|(index, path)| pipeline.process_existing(path, index))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| OrchestratorError::Worker(e.to_string()))?;

    let mut counties: Vec<String> = results.iter().map(|r| r.county_fips.clone()).collect();
    counties.sort();
    counties.dedup();

    let summary = BatchSummary::new(
        results.iter().map(|r| r.start_date).min(),
        results.iter().map(|r| r.end_date).max(),
        None,
        counties,
        results,
        started.elapsed(),
    );
    summary.log();
    Ok(summary)
}
