//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use terrascore_orchestrator::{CountySelection, Interval};

/// Terrascore - County obsolescence and growth scores from satellite imagery.
#[derive(Debug, Parser)]
#[command(name = "terrascore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.terrascore/config.toml)
    #[arg(short, long, global = true, env = "TERRASCORE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (counts and FIPS codes only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Backfill scores over a date range split into intervals
    Historical(HistoricalArgs),

    /// Collect (and by default process and store) one recent window
    Collect(CollectArgs),

    /// Score and store raw collections already on disk
    Process(ProcessArgs),

    /// Show or export a county's stored time series
    Series(SeriesArgs),

    /// List counties with stored data
    Counties,
}

/// County selection flags; at most one may be given.
#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct CountyArgs {
    /// Comma-separated list of county FIPS codes
    #[arg(long)]
    pub counties: Option<String>,

    /// Every county in the boundary dataset
    #[arg(long)]
    pub all_counties: bool,

    /// Every county in a state (state FIPS code)
    #[arg(long)]
    pub state: Option<String>,
}

impl CountyArgs {
    /// The selection these flags describe
    pub fn selection(&self) -> CountySelection {
        CountySelection::from_flags(
            self.counties.as_deref(),
            self.all_counties,
            self.state.as_deref(),
        )
    }
}

/// Interval argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IntervalArg {
    /// One day
    Daily,
    /// Seven days
    Weekly,
    /// One month
    Monthly,
    /// Three months
    Quarterly,
    /// One year
    Yearly,
}

/// Arguments for the historical command.
#[derive(Debug, Parser)]
pub struct HistoricalArgs {
    #[command(flatten)]
    pub counties: CountyArgs,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: NaiveDate,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: NaiveDate,

    /// Sub-interval length
    #[arg(short, long, value_enum, default_value = "quarterly")]
    pub interval: IntervalArg,

    /// Number of parallel workers (overrides the config file)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Imagery service credentials file
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

/// Arguments for the collect command.
#[derive(Debug, Parser)]
pub struct CollectArgs {
    #[command(flatten)]
    pub counties: CountyArgs,

    /// First day of the window (default depends on --interval)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the window (default: today)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Collection cadence; picks the default window length
    #[arg(short, long, value_enum, default_value = "weekly")]
    pub interval: IntervalArg,

    /// Number of parallel workers (overrides the config file)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Imagery service credentials file
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Process existing raw collections instead of collecting
    #[arg(long, conflicts_with = "skip_processing")]
    pub skip_collection: bool,

    /// Collect only; leave raw files for a later `process` run
    #[arg(long)]
    pub skip_processing: bool,
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Raw collection directory (overrides the config file)
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,
}

/// Arguments for the series command.
#[derive(Debug, Parser)]
pub struct SeriesArgs {
    /// County FIPS code
    pub county_fips: String,

    /// Inclusive lower bound
    #[arg(long)]
    pub start_date: Option<String>,

    /// Inclusive upper bound
    #[arg(long)]
    pub end_date: Option<String>,

    /// Write the series as CSV to this file instead of printing it
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<IntervalArg> for Interval {
    fn from(interval: IntervalArg) -> Self {
        match interval {
            IntervalArg::Daily => Interval::Daily,
            IntervalArg::Weekly => Interval::Weekly,
            IntervalArg::Monthly => Interval::Monthly,
            IntervalArg::Quarterly => Interval::Quarterly,
            IntervalArg::Yearly => Interval::Yearly,
        }
    }
}
