//! HTTP request handlers for the query API.
//!
//! Every read goes through the shared [`QueryService`]; handlers only translate
//! parameters and errors.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use terrascore_domain::traits::TimeSeriesStore;
use terrascore_domain::CountyTimeSeries;
use terrascore_query::{CountySummary, LatestSnapshot, MetricsAtDate, QueryError, QueryService};
use terrascore_store::StoreError;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Read-only access to the store
    pub query: QueryService,
}

/// Query string of the time-series endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TimeSeriesParams {
    /// Inclusive lower bound
    pub start_date: Option<String>,
    /// Inclusive upper bound
    pub end_date: Option<String>,
}

/// Query string of the metrics endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MetricsParams {
    /// Target date (`YYYY-MM-DD` or ISO-8601)
    pub date: Option<String>,
    /// Metric name
    pub metric: Option<String>,
}

/// County listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct CountiesResponse {
    /// One entry per stored county
    pub counties: Vec<CountySummary>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of stored counties
    pub county_count: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed request parameter
    BadRequest(String),
    /// No data for the requested county
    NotFound(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalError(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::BadRequest(msg) => AppError::BadRequest(msg),
            e @ QueryError::NotFound(_) => AppError::NotFound(e.to_string()),
            QueryError::Store(e @ StoreError::InvalidKey(_)) => AppError::BadRequest(e.to_string()),
            e @ QueryError::Store(_) => AppError::InternalError(e.to_string()),
        }
    }
}

/// Run a query on the blocking pool
async fn run_query<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&QueryService) -> Result<T, QueryError> + Send + 'static,
{
    let query = state.query.clone();
    tokio::task::spawn_blocking(move || f(&query))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .map_err(AppError::from)
}

/// GET / - API information
async fn root() -> Json<Value> {
    Json(json!({
        "name": "Terrascore Time Series API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "counties": "/api/v1/counties",
            "time_series": "/api/v1/time_series/{county_fips}",
            "latest": "/api/v1/latest/{county_fips}",
            "metrics": "/api/v1/metrics?date=YYYY-MM-DD&metric={metric}"
        }
    }))
}

/// GET /health - Liveness plus store size
pub(crate) async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthCheckResponse>, AppError> {
    let counties = run_query(&state, |q| Ok(q.store().list_counties()?)).await?;
    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        county_count: counties.len(),
    }))
}

/// GET /counties - Every county with data
pub(crate) async fn get_counties(
    State(state): State<AppState>,
) -> Result<Json<CountiesResponse>, AppError> {
    let counties = run_query(&state, |q| q.counties()).await?;
    Ok(Json(CountiesResponse { counties }))
}

/// GET /time_series/:county_fips - Full or filtered series
pub(crate) async fn get_time_series(
    State(state): State<AppState>,
    Path(county_fips): Path<String>,
    Query(params): Query<TimeSeriesParams>,
) -> Result<Json<CountyTimeSeries>, AppError> {
    let series = run_query(&state, move |q| {
        q.time_series(
            &county_fips,
            params.start_date.as_deref(),
            params.end_date.as_deref(),
        )
    })
    .await?;
    Ok(Json(series))
}

/// GET /latest/:county_fips - Most recent snapshot
pub(crate) async fn get_latest(
    State(state): State<AppState>,
    Path(county_fips): Path<String>,
) -> Result<Json<LatestSnapshot>, AppError> {
    let latest = run_query(&state, move |q| q.latest(&county_fips)).await?;
    Ok(Json(latest))
}

/// GET /metrics?date&metric - One metric for every county near a date
pub(crate) async fn get_metrics(
    State(state): State<AppState>,
    Query(params): Query<MetricsParams>,
) -> Result<Json<MetricsAtDate>, AppError> {
    let date = params
        .date
        .ok_or_else(|| AppError::BadRequest("Missing query parameter: date".to_string()))?;
    let metric = params
        .metric
        .ok_or_else(|| AppError::BadRequest("Missing query parameter: metric".to_string()))?;

    let result = run_query(&state, move |q| q.metrics_near(&date, &metric)).await?;
    Ok(Json(result))
}

/// The four read routes, without prefix
fn read_routes() -> AxumRouter<AppState> {
    AxumRouter::new()
        .route("/counties", get(get_counties))
        .route("/time_series/:county_fips", get(get_time_series))
        .route("/latest/:county_fips", get(get_latest))
        .route("/metrics", get(get_metrics))
}

/// Create the axum router with all routes
///
/// Read routes are served both bare and under `/api/v1`.
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(read_routes())
        .nest("/api/v1", read_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
