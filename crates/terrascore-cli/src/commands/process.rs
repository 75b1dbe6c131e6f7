//! Process command implementation.

use super::build_processing_pipeline;
use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::PathBuf;
use std::sync::Arc;
use terrascore_orchestrator::process_raw;

/// Execute the process command.
pub async fn execute_process(
    args: ProcessArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let raw_dir = args
        .raw_dir
        .unwrap_or_else(|| config.collector_config().raw_dir);
    run_process(raw_dir, config, formatter).await
}

/// Score and store every raw collection under `raw_dir`
pub(crate) async fn run_process(
    raw_dir: PathBuf,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    // Processor and store only; boundaries and credentials are never loaded
    let pipeline = Arc::new(build_processing_pipeline(config)?);
    let summary = process_raw(pipeline, &raw_dir).await?;
    let report = summary.write(&config.storage.reports_dir)?;

    println!("{}", formatter.format_summary(&summary)?);
    println!("{}", formatter.written("Summary", &report));
    Ok(())
}
