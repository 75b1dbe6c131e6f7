//! Integration tests for terrascore-collector
//!
//! The collector runs against the scripted mock service and a small boundary dataset.

use chrono::NaiveDate;
use std::sync::Arc;
use terrascore_collector::mock::{default_pixel, ScriptedScene};
use terrascore_collector::{
    CollectorConfig, CollectorError, GeoJsonBoundaries, ImageryCollector, MockImageryService,
};
use terrascore_domain::{CollectionMetadata, SampleSet, SpectralIndex};

const DATASET: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"GEOID": "06037", "NAME": "Los Angeles", "STATEFP": "06"},
            "geometry": {"type": "Polygon", "coordinates": [[[-118.9, 33.7], [-117.6, 33.7], [-117.6, 34.8], [-118.9, 34.8], [-118.9, 33.7]]]}
        },
        {
            "type": "Feature",
            "properties": {"GEOID": "36061", "NAME": "New York", "STATEFP": "36"},
            "geometry": {"type": "Polygon", "coordinates": [[[-74.05, 40.68], [-73.9, 40.68], [-73.9, 40.88], [-74.05, 40.88], [-74.05, 40.68]]]}
        }
    ]
}"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn collector(raw_dir: &std::path::Path, service: MockImageryService) -> ImageryCollector {
    let config = CollectorConfig {
        raw_dir: raw_dir.to_path_buf(),
        points_per_region: 40,
        ..Default::default()
    };
    let boundaries = Arc::new(GeoJsonBoundaries::from_geojson_str(DATASET).unwrap());
    ImageryCollector::new(config, boundaries, Box::new(service))
}

#[test]
fn test_collect_writes_samples_and_metadata() {
    let raw = tempfile::tempdir().unwrap();
    let collector = collector(raw.path(), MockImageryService::new());

    let handle = collector
        .collect("06037", date(2023, 1, 1), date(2023, 3, 31))
        .unwrap()
        .unwrap();

    assert_eq!(handle.samples.len(), 40);
    assert!(handle.samples.has_band(SpectralIndex::Ndvi));
    assert!(handle.samples.has_band(SpectralIndex::Bsi));
    assert_eq!(handle.metadata.image_count, 3);
    assert_eq!(handle.metadata.county_name, "Los Angeles");

    let dir = handle.sample_path.parent().unwrap();
    assert!(dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("06037_"));
    assert_eq!(
        handle.sample_path.file_name().unwrap(),
        "06037_samples.geojson"
    );

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&handle.sample_path).unwrap()).unwrap();
    let reread = SampleSet::from_geojson(&on_disk).unwrap();
    assert_eq!(reread.len(), 40);

    let meta: CollectionMetadata =
        serde_json::from_str(&std::fs::read_to_string(&handle.metadata_path).unwrap()).unwrap();
    assert_eq!(meta, handle.metadata);
    assert_eq!(meta.start_date, date(2023, 1, 1));
}

#[test]
fn test_uniform_pixels_give_expected_ndvi() {
    let raw = tempfile::tempdir().unwrap();
    let collector = collector(raw.path(), MockImageryService::new());

    let handle = collector
        .collect("36061", date(2023, 6, 1), date(2023, 6, 30))
        .unwrap()
        .unwrap();
    // B8 = 3000, B4 = 600
    let expected = 2400.0 / 3600.0;
    for sample in &handle.samples.samples {
        assert!((sample.get(SpectralIndex::Ndvi).unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_no_imagery_returns_none() {
    let raw = tempfile::tempdir().unwrap();
    let mock = MockImageryService::new().with_no_imagery("06037");
    let collector = collector(raw.path(), mock.clone());

    let result = collector
        .collect("06037", date(2023, 1, 1), date(2023, 1, 31))
        .unwrap();
    assert!(result.is_none());
    assert_eq!(mock.call_count(), 1);
    assert_eq!(std::fs::read_dir(raw.path()).unwrap().count(), 0);
}

#[test]
fn test_unknown_county() {
    let raw = tempfile::tempdir().unwrap();
    let mock = MockImageryService::new();
    let collector = collector(raw.path(), mock.clone());

    let result = collector.collect("99999", date(2023, 1, 1), date(2023, 1, 31));
    assert!(matches!(result, Err(CollectorError::CountyNotFound(_))));
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_scene_filtering_and_cap() {
    let raw = tempfile::tempdir().unwrap();
    // 12 clear scenes plus two above the 30% threshold
    let mut scenes: Vec<ScriptedScene> = (0..12)
        .map(|i| ScriptedScene::new(i as f64, default_pixel()))
        .collect();
    scenes.push(ScriptedScene::new(45.0, default_pixel()));
    scenes.push(ScriptedScene::new(80.0, default_pixel()));
    let mock = MockImageryService::new().with_scenes("06037", scenes);
    let collector = collector(raw.path(), mock);

    let handle = collector
        .collect("06037", date(2023, 1, 1), date(2023, 12, 31))
        .unwrap()
        .unwrap();
    assert_eq!(handle.metadata.image_count, 10);
}

#[test]
fn test_fully_masked_scenes_give_empty_sample_set() {
    let raw = tempfile::tempdir().unwrap();
    let mut cloudy = default_pixel();
    cloudy.cloud_probability = Some(90.0);
    let mock = MockImageryService::new().with_scenes("06037", vec![ScriptedScene::new(10.0, cloudy)]);
    let collector = collector(raw.path(), mock);

    let handle = collector
        .collect("06037", date(2023, 1, 1), date(2023, 1, 31))
        .unwrap()
        .unwrap();
    assert!(handle.samples.is_empty());
    assert_eq!(handle.metadata.image_count, 1);
}

#[test]
fn test_service_failure_propagates() {
    let raw = tempfile::tempdir().unwrap();
    let mock = MockImageryService::new().with_failure("06037");
    let collector = collector(raw.path(), mock);

    let result = collector.collect("06037", date(2023, 1, 1), date(2023, 1, 31));
    assert!(matches!(result, Err(CollectorError::Imagery(_))));
}
