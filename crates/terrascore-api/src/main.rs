//! Terrascore API server
//!
//! Serves county time series from the processed store over HTTP.

use std::env;
use std::process;
use terrascore_api::{config::ServerConfig, start_server, ApiError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ApiError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        return Ok(());
    } else {
        ServerConfig::default()
    };

    start_server(config).await
}

fn print_help() {
    println!("Terrascore API - County score time series over HTTP");
    println!();
    println!("USAGE:");
    println!("    terrascore-api [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    [api]      bind_address, bind_port (default 8001), nearest_window_days");
    println!("    [storage]  time_series_dir (default data/processed/time_series)");
    println!();
}
