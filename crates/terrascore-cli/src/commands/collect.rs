//! Collect command implementation.

use super::{build_orchestrator, RunOverrides};
use crate::cli::CollectArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::{Local, NaiveDate};
use terrascore_orchestrator::{DateWindow, Interval, PipelineMode};

/// Resolve the collection window from the flags
///
/// `end` defaults to `today`; `start` defaults to a cadence-dependent lookback.
pub fn collection_window(args: &CollectArgs, today: NaiveDate) -> Result<DateWindow> {
    let end = args.end_date.unwrap_or(today);
    let start = args
        .start_date
        .unwrap_or_else(|| Interval::from(args.interval).default_start(end));
    if start > end {
        return Err(CliError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(DateWindow::new(start, end))
}

/// Execute the collect command.
pub async fn execute_collect(
    args: CollectArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    if args.skip_collection {
        println!("{}", formatter.info("Skipping data collection as requested"));
        return super::process::run_process(config.collector_config().raw_dir, config, formatter)
            .await;
    }

    let window = collection_window(&args, Local::now().date_naive())?;
    let mode = if args.skip_processing {
        PipelineMode::CollectOnly
    } else {
        PipelineMode::Full
    };

    let orchestrator = build_orchestrator(
        config,
        RunOverrides {
            parallel: args.parallel,
            credentials: args.credentials.clone(),
        },
    )?;
    let counties = args
        .counties
        .selection()
        .resolve(orchestrator.pipeline().boundaries());
    if counties.is_empty() {
        return Err(CliError::InvalidInput("No counties selected".to_string()));
    }

    let summary = orchestrator.run_collect(counties, window, mode).await?;
    let report = summary.write(&config.storage.reports_dir)?;

    println!("{}", formatter.format_summary(&summary)?);
    if mode == PipelineMode::CollectOnly {
        println!(
            "{}",
            formatter.info("Skipping data processing as requested")
        );
    }
    println!("{}", formatter.written("Summary", &report));
    Ok(())
}
