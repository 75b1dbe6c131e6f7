//! Command implementations.

pub mod collect;
pub mod historical;
pub mod process;
pub mod series;

pub use self::collect::execute_collect;
pub use self::historical::execute_historical;
pub use self::process::execute_process;
pub use self::series::{execute_counties, execute_series};

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use terrascore_collector::{GeoJsonBoundaries, HttpImageryFactory};
use terrascore_domain::traits::ImageryServiceFactory;
use terrascore_orchestrator::{Orchestrator, Pipeline};
use terrascore_processor::MetricsProcessor;
use terrascore_query::QueryService;
use terrascore_store::FileStore;
use tracing::info;

/// Overrides a command may apply on top of the config file
#[derive(Debug, Default)]
pub struct RunOverrides {
    /// Worker count
    pub parallel: Option<usize>,
    /// Credentials file
    pub credentials: Option<PathBuf>,
}

/// Assemble a pipeline from configuration
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let collector = config.collector_config();
    let boundaries = GeoJsonBoundaries::from_path(&collector.boundaries_path)?;
    info!(
        counties = boundaries.len(),
        path = %collector.boundaries_path.display(),
        "Loaded county boundaries"
    );
    let store = Arc::new(FileStore::new(&config.storage.time_series_dir)?);
    Ok(Pipeline::new(
        collector,
        Arc::new(boundaries),
        MetricsProcessor::new(config.processor_config()),
        store,
    ))
}

/// Assemble a pipeline for scoring raw collections already on disk
///
/// Neither the boundary dataset nor the imagery service is touched.
pub fn build_processing_pipeline(config: &Config) -> Result<Pipeline> {
    let store = Arc::new(FileStore::new(&config.storage.time_series_dir)?);
    Ok(Pipeline::processing_only(
        MetricsProcessor::new(config.processor_config()),
        store,
    ))
}

/// Assemble an orchestrator backed by the HTTP imagery service
pub fn build_orchestrator(config: &Config, overrides: RunOverrides) -> Result<Orchestrator> {
    let mut factory = HttpImageryFactory::new(config.imagery.clone());
    if let Some(path) = overrides.credentials {
        factory = factory.with_credentials(path);
    }
    build_orchestrator_with(config, Arc::new(factory), overrides.parallel)
}

/// Assemble an orchestrator around any imagery client factory
pub fn build_orchestrator_with(
    config: &Config,
    factory: Arc<dyn ImageryServiceFactory>,
    parallel: Option<usize>,
) -> Result<Orchestrator> {
    let mut orchestrator_config = config.orchestrator.clone();
    if let Some(parallel) = parallel {
        orchestrator_config.parallel = parallel;
    }
    Ok(Orchestrator::new(
        build_pipeline(config)?,
        factory,
        orchestrator_config,
    )?)
}

/// Read-only view over the configured store
pub fn query_service(config: &Config) -> Result<QueryService> {
    let store = Arc::new(FileStore::new(&config.storage.time_series_dir)?);
    Ok(QueryService::new(store, config.api.clone()))
}
