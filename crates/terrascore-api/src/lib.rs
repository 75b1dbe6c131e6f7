//! Terrascore API
//!
//! Read-only HTTP surfaces over the time-series store: the query API and the
//! dashboard server. Both answer through [`terrascore_query::QueryService`].

#![warn(missing_docs)]

pub mod config;
pub mod dashboard;
pub mod handlers;

use axum::Router as AxumRouter;
use config::ServerConfig;
use dashboard::create_dashboard_router;
use handlers::{create_router, AppState};
use std::sync::Arc;
use terrascore_query::QueryService;
use terrascore_store::{FileStore, StoreError};
use tokio::net::TcpListener;
use tracing::info;

/// API server error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state for either server
pub fn build_state(config: &ServerConfig) -> Result<AppState, ApiError> {
    let store = Arc::new(FileStore::new(&config.time_series_dir)?);
    Ok(AppState {
        query: QueryService::new(store, config.query_config()),
    })
}

async fn serve(app: AxumRouter, addr: String, name: &str) -> Result<(), ApiError> {
    let listener = TcpListener::bind(&addr).await?;
    info!("{} listening on {}", name, addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Server(e.to_string()))
}

/// Start the query API server
pub async fn start_server(config: ServerConfig) -> Result<(), ApiError> {
    info!("Starting Terrascore API");
    info!("Time series directory: {}", config.time_series_dir.display());

    let state = build_state(&config)?;
    serve(create_router(state), config.bind_addr(), "API").await
}

/// Start the dashboard server
pub async fn start_dashboard(config: ServerConfig) -> Result<(), ApiError> {
    info!("Starting Terrascore dashboard");
    info!("Time series directory: {}", config.time_series_dir.display());

    let state = build_state(&config)?;
    serve(
        create_dashboard_router(state),
        config.dashboard_addr(),
        "Dashboard",
    )
    .await
}
