//! Historical command implementation.

use super::{build_orchestrator, RunOverrides};
use crate::cli::HistoricalArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use terrascore_orchestrator::{DateWindow, Interval};

/// Execute the historical command.
pub async fn execute_historical(
    args: HistoricalArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    if args.start_date > args.end_date {
        return Err(CliError::InvalidInput(format!(
            "--start-date {} is after --end-date {}",
            args.start_date, args.end_date
        )));
    }

    let orchestrator = build_orchestrator(
        config,
        RunOverrides {
            parallel: args.parallel,
            credentials: args.credentials,
        },
    )?;
    let counties = args
        .counties
        .selection()
        .resolve(orchestrator.pipeline().boundaries());
    if counties.is_empty() {
        return Err(CliError::InvalidInput("No counties selected".to_string()));
    }

    let summary = orchestrator
        .run_historical(
            counties,
            DateWindow::new(args.start_date, args.end_date),
            Interval::from(args.interval),
        )
        .await?;
    let report = summary.write(&config.storage.reports_dir)?;

    println!("{}", formatter.format_summary(&summary)?);
    println!("{}", formatter.written("Summary", &report));
    Ok(())
}
