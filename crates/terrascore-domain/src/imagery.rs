//! Vocabulary for talking to an external imagery service
//!
//! The service is an opaque capability: given a region, sample points, a date range,
//! a cloud-cover filter and a band list, it returns the scenes that intersect the
//! region, each reduced to per-point band observations.

use chrono::NaiveDate;
use geo::{Point, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors reported by an imagery service
#[derive(Error, Debug, Clone)]
pub enum ImageryError {
    /// Credentials rejected or service could not be initialized
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Anything else
    #[error("Imagery service error: {0}")]
    Other(String),
}

/// One request to the imagery service
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryQuery {
    /// County the request is made for (informational)
    pub county_fips: String,
    /// Region scenes must intersect
    pub region: Polygon<f64>,
    /// Points at which band values are wanted
    pub points: Vec<Point<f64>>,
    /// First day of the window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the window
    pub end_date: NaiveDate,
    /// Scenes with a larger cloudy-pixel percentage are excluded
    pub max_cloud_pct: f64,
    /// Band names to return ("B2", "B3", ...)
    pub bands: Vec<String>,
    /// Maximum number of scenes wanted
    pub max_scenes: usize,
}

/// Band values and cloud flags for one point in one scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelObservation {
    /// Raw band reflectances keyed by band name
    pub reflectance: BTreeMap<String, f64>,
    /// Cloud probability, 0..100
    #[serde(default)]
    pub cloud_probability: Option<f64>,
    /// Classified as opaque cloud
    #[serde(default)]
    pub opaque_cloud: bool,
    /// Classified as cirrus
    #[serde(default)]
    pub cirrus: bool,
}

/// One acquired scene reduced to the requested points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene identifier
    pub id: String,
    /// Acquisition date
    pub acquired: NaiveDate,
    /// Percentage of cloudy pixels over the whole scene
    pub cloud_cover_pct: f64,
    /// Observations aligned with [`ImageryQuery::points`]; `None` where the scene has no data
    pub pixels: Vec<Option<PixelObservation>>,
}

impl PixelObservation {
    /// Builder-style band setter
    pub fn with_band(mut self, band: impl Into<String>, value: f64) -> Self {
        self.reflectance.insert(band.into(), value);
        self
    }
}
