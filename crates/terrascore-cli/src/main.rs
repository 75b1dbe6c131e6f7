//! Terrascore CLI - County obsolescence and growth scores from satellite imagery.

use clap::Parser;
use terrascore_cli::commands;
use terrascore_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> terrascore_cli::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Historical(args) => {
            commands::execute_historical(args, &config, &formatter).await?;
        }
        Command::Collect(args) => {
            commands::execute_collect(args, &config, &formatter).await?;
        }
        Command::Process(args) => {
            commands::execute_process(args, &config, &formatter).await?;
        }
        Command::Series(args) => {
            commands::execute_series(args, &config, &formatter).await?;
        }
        Command::Counties => {
            commands::execute_counties(&config, &formatter).await?;
        }
    }

    Ok(())
}
