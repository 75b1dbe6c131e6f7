//! Dashboard server routes
//!
//! Serves a static HTML index plus the same read operations as the query API,
//! answered by the shared query layer rather than by proxying to the API.

use crate::handlers::{get_counties, get_latest, get_metrics, get_time_series, AppState};
use axum::{response::Html, routing::get, Router as AxumRouter};
use tower_http::cors::CorsLayer;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Terrascore Dashboard</title>
  <style>
    body { font-family: sans-serif; margin: 2rem; }
    table { border-collapse: collapse; }
    td, th { border: 1px solid #ccc; padding: 0.3rem 0.6rem; }
  </style>
</head>
<body>
  <h1>Terrascore County Scores</h1>
  <table id="counties">
    <thead><tr><th>FIPS</th><th>Name</th><th>Points</th><th>Latest</th></tr></thead>
    <tbody></tbody>
  </table>
  <script>
    fetch('/api/v1/counties')
      .then(r => r.json())
      .then(data => {
        const body = document.querySelector('#counties tbody');
        for (const c of data.counties) {
          const row = document.createElement('tr');
          for (const v of [c.county_fips, c.county_name || '', c.data_point_count, c.latest_timestamp || '']) {
            const cell = document.createElement('td');
            cell.textContent = v;
            row.appendChild(cell);
          }
          body.appendChild(row);
        }
      });
  </script>
</body>
</html>
"#;

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Create the dashboard router
pub fn create_dashboard_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/", get(index))
        .route("/api/v1/counties", get(get_counties))
        .route("/api/v1/time_series/:county_fips", get(get_time_series))
        .route("/api/v1/latest/:county_fips", get(get_latest))
        .route("/api/metrics", get(get_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
