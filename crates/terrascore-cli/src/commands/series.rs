//! Series and counties command implementations.

use super::query_service;
use crate::cli::SeriesArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;

/// Execute the series command.
pub async fn execute_series(
    args: SeriesArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let query = query_service(config)?;

    if let Some(path) = args.csv {
        let table = query.store().export_table(&args.county_fips)?;
        if table.is_empty() {
            return Err(CliError::InvalidInput(format!(
                "No data for county {}",
                args.county_fips
            )));
        }
        let csv = table.to_csv().map_err(|e| CliError::Csv(e.to_string()))?;
        fs::write(&path, csv)?;
        println!("{}", formatter.written("Time series", &path));
        return Ok(());
    }

    let series = query.time_series(
        &args.county_fips,
        args.start_date.as_deref(),
        args.end_date.as_deref(),
    )?;
    println!("{}", formatter.format_series(&series)?);
    Ok(())
}

/// Execute the counties command.
pub async fn execute_counties(config: &Config, formatter: &Formatter) -> Result<()> {
    let counties = query_service(config)?.counties()?;
    println!("{}", formatter.format_counties(&counties)?);
    Ok(())
}
