//! Spectral index samples
//!
//! A [`SampleSet`] is the hand-off between the collector and the processor. On disk it
//! is a GeoJSON FeatureCollection of Point features whose properties are index values.

use crate::SpectralIndex;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Index values observed at one sample point
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSample {
    /// Longitude (WGS84)
    pub longitude: f64,
    /// Latitude (WGS84)
    pub latitude: f64,
    /// Index values present at this point
    pub values: BTreeMap<SpectralIndex, f64>,
}

impl IndexSample {
    /// Create a sample with no values
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style value setter
    pub fn with(mut self, index: SpectralIndex, value: f64) -> Self {
        self.values.insert(index, value);
        self
    }

    /// Value of an index at this point, if present
    pub fn get(&self, index: SpectralIndex) -> Option<f64> {
        self.values.get(&index).copied()
    }
}

/// Spatial samples for one (county, date range) request
///
/// `bands` records which index columns the sample set carries, even when individual
/// samples have no value for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    /// Index columns carried by this set
    pub bands: BTreeSet<SpectralIndex>,
    /// The samples
    pub samples: Vec<IndexSample>,
}

impl SampleSet {
    /// Create an empty sample set carrying the given columns
    pub fn with_bands(bands: impl IntoIterator<Item = SpectralIndex>) -> Self {
        Self {
            bands: bands.into_iter().collect(),
            samples: Vec::new(),
        }
    }

    /// Build a sample set from samples, deriving the columns from the values present
    pub fn from_samples(samples: Vec<IndexSample>) -> Self {
        let bands = samples
            .iter()
            .flat_map(|s| s.values.keys().copied())
            .collect();
        Self { bands, samples }
    }

    /// Append a sample, widening the column set as needed
    pub fn push(&mut self, sample: IndexSample) {
        self.bands.extend(sample.values.keys().copied());
        self.samples.push(sample);
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the set carries a column for the index
    pub fn has_band(&self, index: SpectralIndex) -> bool {
        self.bands.contains(&index)
    }

    /// Required columns that this set does not carry
    pub fn missing_bands(&self, required: &[SpectralIndex]) -> Vec<SpectralIndex> {
        required
            .iter()
            .copied()
            .filter(|index| !self.has_band(*index))
            .collect()
    }

    /// Render as a GeoJSON FeatureCollection
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .samples
            .iter()
            .map(|sample| {
                let mut properties = Map::new();
                for band in &self.bands {
                    let value = sample.get(*band).map(Value::from).unwrap_or(Value::Null);
                    properties.insert(band.as_str().to_string(), value);
                }
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [sample.longitude, sample.latitude]
                    },
                    "properties": properties
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features
        })
    }

    /// Parse a GeoJSON FeatureCollection
    ///
    /// Unknown property keys are ignored; null or non-numeric values leave the index
    /// absent for that sample while still registering the column.
    pub fn from_geojson(value: &Value) -> Result<Self, String> {
        let features = match value.get("features") {
            Some(Value::Array(features)) => features,
            Some(_) => return Err("'features' is not an array".to_string()),
            None => return Err("Missing 'features' member".to_string()),
        };

        let mut set = SampleSet::default();
        for feature in features {
            let (longitude, latitude) = feature
                .get("geometry")
                .and_then(|g| g.get("coordinates"))
                .and_then(Value::as_array)
                .and_then(|c| Some((c.first()?.as_f64()?, c.get(1)?.as_f64()?)))
                .unwrap_or((f64::NAN, f64::NAN));

            let mut sample = IndexSample::new(longitude, latitude);
            if let Some(Value::Object(properties)) = feature.get("properties") {
                for (key, raw) in properties {
                    let Ok(index) = key.parse::<SpectralIndex>() else {
                        continue;
                    };
                    set.bands.insert(index);
                    if let Some(v) = raw.as_f64() {
                        sample.values.insert(index, v);
                    }
                }
            }
            set.samples.push(sample);
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples_derives_bands() {
        let set = SampleSet::from_samples(vec![
            IndexSample::new(0.0, 0.0).with(SpectralIndex::Ndvi, 0.4),
            IndexSample::new(1.0, 1.0).with(SpectralIndex::Ndbi, 0.1),
        ]);
        assert!(set.has_band(SpectralIndex::Ndvi));
        assert!(set.has_band(SpectralIndex::Ndbi));
        assert!(!set.has_band(SpectralIndex::Ui));
        assert_eq!(
            set.missing_bands(&[SpectralIndex::Ndvi, SpectralIndex::Ui]),
            vec![SpectralIndex::Ui]
        );
    }

    #[test]
    fn test_geojson_keeps_null_columns() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-118.2, 34.1]},
                    "properties": {"NDVI": 0.31, "NDBI": null, "id": "0_0"}
                }
            ]
        });

        let set = SampleSet::from_geojson(&value).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.has_band(SpectralIndex::Ndbi));
        assert_eq!(set.samples[0].get(SpectralIndex::Ndvi), Some(0.31));
        assert_eq!(set.samples[0].get(SpectralIndex::Ndbi), None);
        assert_eq!(set.samples[0].longitude, -118.2);
    }

    #[test]
    fn test_geojson_output_shape() {
        let mut set = SampleSet::with_bands([SpectralIndex::Ndvi, SpectralIndex::Ui]);
        set.push(IndexSample::new(-100.0, 40.0).with(SpectralIndex::Ndvi, 0.5));

        let value = set.to_geojson();
        assert_eq!(value["type"], "FeatureCollection");
        let props = &value["features"][0]["properties"];
        assert_eq!(props["NDVI"], 0.5);
        assert!(props["UI"].is_null());
    }

    #[test]
    fn test_missing_features_is_error() {
        assert!(SampleSet::from_geojson(&json!({"type": "FeatureCollection"})).is_err());
    }
}
