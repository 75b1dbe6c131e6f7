//! Terrascore dashboard server
//!
//! Serves an HTML overview plus the read endpoints the page uses.

use std::env;
use std::process;
use terrascore_api::{config::ServerConfig, start_dashboard, ApiError};
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

    let config = match args.get(1).map(String::as_str) {
        Some("--config") => match args.get(2) {
            Some(path) => ServerConfig::from_file(path)?,
            None => {
                eprintln!("Usage: terrascore-dashboard [--config <path-to-config.toml>]");
                process::exit(2);
            }
        },
        Some("--help") => {
            println!("Terrascore dashboard");
            println!();
            println!("USAGE:");
            println!("    terrascore-dashboard [--config <path-to-config.toml>]");
            println!();
            println!("Listens on [api].dashboard_port (default 5000).");
            return Ok(());
        }
        _ => ServerConfig::default(),
    };

    start_dashboard(config).await
}
