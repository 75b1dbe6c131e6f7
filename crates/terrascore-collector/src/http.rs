//! HTTP client for the external imagery service
//!
//! # Protocol
//!
//! - `GET {endpoint}/v1/status`: authenticated probe sent once at connect time
//! - `POST {endpoint}/v1/scenes:query`: body is [`QueryRequest`], answer is
//!   `{"scenes": [Scene, ...]}`
//!
//! Every request carries `Authorization: Bearer {api_key}` from the credentials file.
//! Requests block the calling thread; with no `timeout_secs` configured they may
//! block indefinitely.

use crate::ImageryConfig;
use chrono::NaiveDate;
use geo::{Point, Polygon};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use terrascore_domain::traits::{ImageryService, ImageryServiceFactory};
use terrascore_domain::{ImageryError, ImageryQuery, Scene};
use tracing::{debug, info};

/// Contents of the credentials file
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Bearer token
    pub api_key: String,
    /// Service account, for logging only
    #[serde(default)]
    pub account: Option<String>,
}

impl Credentials {
    /// Read a credentials file
    pub fn from_path(path: &Path) -> Result<Self, ImageryError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ImageryError::Authentication(format!(
                "Cannot read credentials {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            ImageryError::Authentication(format!(
                "Invalid credentials {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Wire form of an [`ImageryQuery`]
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    county_fips: &'a str,
    /// Exterior ring of the region, `[lon, lat]` pairs
    region: Vec<[f64; 2]>,
    points: Vec<[f64; 2]>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    max_cloud_pct: f64,
    bands: &'a [String],
    max_scenes: usize,
}

impl<'a> QueryRequest<'a> {
    fn new(query: &'a ImageryQuery) -> Self {
        Self {
            county_fips: &query.county_fips,
            region: ring(&query.region),
            points: query.points.iter().map(|p: &Point<f64>| [p.x(), p.y()]).collect(),
            start_date: query.start_date,
            end_date: query.end_date,
            max_cloud_pct: query.max_cloud_pct,
            bands: &query.bands,
            max_scenes: query.max_scenes,
        }
    }
}

fn ring(polygon: &Polygon<f64>) -> Vec<[f64; 2]> {
    polygon.exterior().coords().map(|c| [c.x, c.y]).collect()
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    scenes: Vec<Scene>,
}

/// Authenticated blocking client
pub struct HttpImageryService {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl HttpImageryService {
    /// Load credentials, build the client and probe the service
    ///
    /// Fails with [`ImageryError::Authentication`] when the credentials are missing,
    /// unreadable or rejected, or when the service cannot be reached.
    pub fn connect(config: &ImageryConfig) -> Result<Self, ImageryError> {
        let path = config.credentials_path.as_deref().ok_or_else(|| {
            ImageryError::Authentication("No credentials file configured".to_string())
        })?;
        let credentials = Credentials::from_path(path)?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ImageryError::Other(format!("Failed to build HTTP client: {}", e)))?;

        let service = Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: credentials.api_key,
            client,
        };
        service.probe()?;

        info!(
            endpoint = %service.endpoint,
            account = credentials.account.as_deref().unwrap_or("-"),
            "Imagery service initialized"
        );
        Ok(service)
    }

    fn probe(&self) -> Result<(), ImageryError> {
        let url = format!("{}/v1/status", self.endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| {
                ImageryError::Authentication(format!("Imagery service unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(ImageryError::Authentication(format!(
                "Probe rejected: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

impl ImageryService for HttpImageryService {
    fn query(&self, query: &ImageryQuery) -> Result<Vec<Scene>, ImageryError> {
        let url = format!("{}/v1/scenes:query", self.endpoint);
        debug!(county_fips = %query.county_fips, points = query.points.len(), "Querying scenes");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&QueryRequest::new(query))
            .send()
            .map_err(|e| ImageryError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ImageryError::Authentication(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ImageryError::Communication(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .map_err(|e| ImageryError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        Ok(parsed.scenes)
    }
}

/// Builds one [`HttpImageryService`] per caller
#[derive(Debug, Clone)]
pub struct HttpImageryFactory {
    config: ImageryConfig,
}

impl HttpImageryFactory {
    /// A factory for the given settings
    pub fn new(config: ImageryConfig) -> Self {
        Self { config }
    }

    /// Override the credentials file
    pub fn with_credentials(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_path = Some(path.into());
        self
    }
}

impl ImageryServiceFactory for HttpImageryFactory {
    fn create(&self) -> Result<Box<dyn ImageryService>, ImageryError> {
        Ok(Box::new(HttpImageryService::connect(&self.config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};

    #[test]
    fn test_missing_credentials_is_auth_error() {
        let result = HttpImageryService::connect(&ImageryConfig::default());
        assert!(matches!(result, Err(ImageryError::Authentication(_))));

        let factory = HttpImageryFactory::new(ImageryConfig::default())
            .with_credentials("/nonexistent/terrascore-credentials.json");
        assert!(matches!(factory.create(), Err(ImageryError::Authentication(_))));
    }

    #[test]
    fn test_malformed_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{\"account\": \"svc\"}").unwrap();
        assert!(matches!(
            Credentials::from_path(&path),
            Err(ImageryError::Authentication(_))
        ));
    }

    #[test]
    fn test_request_wire_shape() {
        let query = ImageryQuery {
            county_fips: "06037".to_string(),
            region: polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)],
            points: vec![point!(x: 0.5, y: 0.25)],
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            max_cloud_pct: 30.0,
            bands: vec!["B8".to_string()],
            max_scenes: 10,
        };
        let value = serde_json::to_value(QueryRequest::new(&query)).unwrap();
        assert_eq!(value["points"][0][1], 0.25);
        assert_eq!(value["start_date"], "2023-01-01");
        assert_eq!(value["region"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_scene_response_parsing() {
        let raw = r#"{"scenes": [{"id": "S2A", "acquired": "2023-01-05", "cloud_cover_pct": 3.5,
            "pixels": [{"reflectance": {"B8": 3000.0}, "cloud_probability": 1.0}, null]}]}"#;
        let parsed: QueryResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.scenes.len(), 1);
        assert!(parsed.scenes[0].pixels[1].is_none());
        assert!(!parsed.scenes[0].pixels[0].as_ref().unwrap().cirrus);
    }
}
