//! County boundaries read from a GeoJSON FeatureCollection
//!
//! Features are expected to carry `GEOID` (county FIPS), `NAME` and `STATEFP`
//! properties and a Polygon or MultiPolygon geometry in WGS84.

use crate::CollectorError;
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use terrascore_domain::traits::BoundarySource;
use terrascore_domain::County;
use tracing::{info, warn};

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, Value>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// In-memory county lookup built from a boundary dataset
#[derive(Debug, Clone, Default)]
pub struct GeoJsonBoundaries {
    counties: BTreeMap<String, County>,
}

impl GeoJsonBoundaries {
    /// Load a dataset from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CollectorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            CollectorError::Boundaries(format!("{}: {}", path.display(), e))
        })?;
        let boundaries = Self::from_geojson_str(&contents)?;
        info!(
            path = %path.display(),
            counties = boundaries.len(),
            "Loaded county boundaries"
        );
        Ok(boundaries)
    }

    /// Parse a dataset
    ///
    /// Features without a `GEOID` or with a non-polygonal geometry are skipped.
    pub fn from_geojson_str(contents: &str) -> Result<Self, CollectorError> {
        let collection: FeatureCollection = serde_json::from_str(contents)
            .map_err(|e| CollectorError::Boundaries(e.to_string()))?;

        let mut counties = BTreeMap::new();
        for feature in collection.features {
            let Some(fips) = property(&feature.properties, "GEOID") else {
                warn!("Skipping boundary feature without GEOID");
                continue;
            };
            let Some(geometry) = feature.geometry.and_then(to_multi_polygon) else {
                warn!(county_fips = %fips, "Skipping boundary feature without polygon geometry");
                continue;
            };
            let name = property(&feature.properties, "NAME").unwrap_or_default();
            let state_fips = property(&feature.properties, "STATEFP")
                .unwrap_or_else(|| fips.chars().take(2).collect());

            counties.insert(fips.clone(), County::new(fips, name, state_fips, geometry));
        }

        Ok(Self { counties })
    }

    /// Build from already-constructed counties
    pub fn from_counties(counties: impl IntoIterator<Item = County>) -> Self {
        Self {
            counties: counties.into_iter().map(|c| (c.fips.clone(), c)).collect(),
        }
    }

    /// Borrow a county by FIPS code
    pub fn geometry_for(&self, fips: &str) -> Option<&County> {
        self.counties.get(fips)
    }

    /// Number of counties
    pub fn len(&self) -> usize {
        self.counties.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }
}

impl BoundarySource for GeoJsonBoundaries {
    fn county(&self, fips: &str) -> Option<County> {
        self.counties.get(fips).cloned()
    }

    fn all_fips(&self) -> Vec<String> {
        self.counties.keys().cloned().collect()
    }

    fn fips_in_state(&self, state_fips: &str) -> Vec<String> {
        self.counties
            .values()
            .filter(|c| c.in_state(state_fips))
            .map(|c| c.fips.clone())
            .collect()
    }
}

/// String property; numbers are accepted and rendered as text
fn property(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ring(coords: Vec<Vec<f64>>) -> LineString<f64> {
    coords
        .into_iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect::<Vec<_>>()
        .into()
}

fn polygon(rings: Vec<Vec<Vec<f64>>>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter().map(ring);
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn to_multi_polygon(geometry: Geometry) -> Option<MultiPolygon<f64>> {
    let polygons: Vec<Polygon<f64>> = match geometry {
        Geometry::Polygon { coordinates } => polygon(coordinates).into_iter().collect(),
        Geometry::MultiPolygon { coordinates } => {
            coordinates.into_iter().filter_map(polygon).collect()
        }
        Geometry::Unsupported => return None,
    };
    if polygons.is_empty() {
        return None;
    }
    Some(MultiPolygon(polygons))
}
