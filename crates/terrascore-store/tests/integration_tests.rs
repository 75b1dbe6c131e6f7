//! Integration tests for terrascore-store
//!
//! These tests exercise the full append/query cycle against a real directory.

use std::sync::Arc;
use std::thread;
use terrascore_domain::traits::TimeSeriesStore;
use terrascore_domain::{ScoreSet, SnapshotMetadata};
use terrascore_store::{FileStore, StoreError};

fn open_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path()).unwrap();
    (dir, store)
}

fn scores(obs: f64, growth: f64) -> ScoreSet {
    ScoreSet::new(Some(obs), Some(growth))
}

#[test]
fn test_round_trip_latest() {
    let (_dir, store) = open_store();

    let metrics = ScoreSet {
        obsolescence_score: Some(0.62),
        growth_potential_score: Some(0.41),
        bivariate_score: Some(0.2542),
    };
    store
        .add_data_point("06037", "2023-06-15", metrics, SnapshotMetadata::default())
        .unwrap();

    let latest = store.get_latest_data_point("06037").unwrap().unwrap();
    assert_eq!(latest.timestamp.to_string(), "2023-06-15T00:00:00");
    assert!((latest.metrics.obsolescence_score.unwrap() - 0.62).abs() < 1e-12);
    assert!((latest.metrics.growth_potential_score.unwrap() - 0.41).abs() < 1e-12);
    assert!((latest.metrics.bivariate_score.unwrap() - 0.2542).abs() < 1e-12);
}

#[test]
fn test_series_sorted_after_every_write() {
    let (_dir, store) = open_store();

    for ts in ["2023-06-01", "20230101_120000", "2023-03-15T08:00:00", "2022-12-31"] {
        store
            .add_data_point("36061", ts, scores(0.5, 0.5), SnapshotMetadata::default())
            .unwrap();

        let series = store.get_time_series("36061").unwrap();
        let sorted = series
            .data_points
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp);
        assert!(sorted, "series out of order after adding {}", ts);
    }

    let series = store.get_time_series("36061").unwrap();
    assert_eq!(series.len(), 4);
    assert_eq!(series.data_points[0].timestamp.to_string(), "2022-12-31T00:00:00");
    assert_eq!(series.data_points[3].timestamp.to_string(), "2023-06-01T00:00:00");
}

#[test]
fn test_duplicate_timestamps_are_kept() {
    let (_dir, store) = open_store();

    store
        .add_data_point("17031", "2023-01-01", scores(0.1, 0.2), SnapshotMetadata::default())
        .unwrap();
    store
        .add_data_point("17031", "2023-01-01", scores(0.3, 0.4), SnapshotMetadata::default())
        .unwrap();

    let series = store.get_time_series("17031").unwrap();
    assert_eq!(series.len(), 2);
    // Stable sort: insertion order preserved for equal timestamps
    assert_eq!(series.data_points[0].metrics.obsolescence_score, Some(0.1));
    assert_eq!(series.data_points[1].metrics.obsolescence_score, Some(0.3));
}

#[test]
fn test_invalid_timestamp_is_rejected() {
    let (_dir, store) = open_store();

    let result = store.add_data_point(
        "06037",
        "15/06/2023",
        scores(0.5, 0.5),
        SnapshotMetadata::default(),
    );
    assert!(matches!(result, Err(StoreError::InvalidTimestamp(_))));
    assert!(!store.has_record("06037"));
}

#[test]
fn test_unknown_county_is_empty_not_error() {
    let (_dir, store) = open_store();

    let series = store.get_time_series("99999").unwrap();
    assert_eq!(series.county_fips, "99999");
    assert!(series.is_empty());
    assert!(store.get_latest_data_point("99999").unwrap().is_none());
    assert!(!store.has_record("99999"));
}

#[test]
fn test_timeframe_bounds_inclusive() {
    let (_dir, store) = open_store();

    for ts in ["2023-01-01", "2023-02-01", "2023-03-01", "2023-04-01"] {
        store
            .add_data_point("06037", ts, scores(0.5, 0.5), SnapshotMetadata::default())
            .unwrap();
    }

    let hits = store
        .get_data_for_timeframe("06037", "2023-02-01", "2023-03-01T00:00:00")
        .unwrap();
    let stamps: Vec<String> = hits.iter().map(|p| p.timestamp.to_string()).collect();
    assert_eq!(stamps, vec!["2023-02-01T00:00:00", "2023-03-01T00:00:00"]);

    let all = store.get_time_series("06037").unwrap();
    let expected: Vec<_> = all
        .data_points
        .iter()
        .filter(|p| p.timestamp.to_string().as_str() >= "2023-02-01T00:00:00"
            && p.timestamp.to_string().as_str() <= "2023-03-01T00:00:00")
        .cloned()
        .collect();
    assert_eq!(hits, expected);

    let bad = store.get_data_for_timeframe("06037", "yesterday", "2023-03-01");
    assert!(matches!(bad, Err(StoreError::InvalidTimestamp(_))));
}

#[test]
fn test_concurrent_appends_to_same_county() {
    let (_dir, store) = open_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..5 {
                    let ts = format!("2023-{:02}-{:02}", i + 1, j + 1);
                    store
                        .add_data_point("06037", &ts, scores(0.5, 0.5), SnapshotMetadata::default())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let series = store.get_time_series("06037").unwrap();
    assert_eq!(series.len(), 40, "no append may be lost");
}

#[test]
fn test_store_processed_metrics_file() {
    let (dir, store) = open_store();

    let metrics_file = dir.path().join("06037_20230615_101500_metrics.json");
    std::fs::write(
        &metrics_file,
        r#"{
            "county_fips": "06037",
            "county_name": "Los Angeles",
            "state_fips": "06",
            "collection_date": "20230615_101500",
            "metrics": {"obsolescence_score": 0.4, "growth_potential_score": 0.5, "bivariate_score": 0.2},
            "metadata": {"start_date": "2023-01-01", "end_date": "2023-06-01", "image_count": 6}
        }"#,
    )
    .unwrap();

    let snapshot = store.store_processed_metrics(&metrics_file).unwrap();
    assert_eq!(snapshot.timestamp.to_string(), "2023-06-15T10:15:00");
    assert_eq!(snapshot.metadata.image_count, Some(6));
    assert_eq!(store.get_time_series("06037").unwrap().len(), 1);
}

#[test]
fn test_store_processed_metrics_requires_fips() {
    let (dir, store) = open_store();

    let metrics_file = dir.path().join("bad_metrics.json");
    std::fs::write(&metrics_file, r#"{"metrics": {}}"#).unwrap();

    let result = store.store_processed_metrics(&metrics_file);
    assert!(matches!(result, Err(StoreError::InvalidData(_))));
}

#[test]
fn test_persisted_layout() {
    let (dir, store) = open_store();

    store
        .add_data_point("06037", "2023-06-15", scores(0.5, 0.25), SnapshotMetadata::default())
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("06037_time_series.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["county_fips"], "06037");
    assert_eq!(value["data_points"][0]["timestamp"], "2023-06-15T00:00:00");
    assert_eq!(value["data_points"][0]["metrics"]["bivariate_score"], 0.125);
}

#[test]
fn test_export_table() {
    let (_dir, store) = open_store();

    store
        .add_data_point("06037", "2023-06-15", scores(0.5, 0.5), SnapshotMetadata::default())
        .unwrap();

    let table = store.export_table("06037").unwrap();
    assert_eq!(table.rows.len(), 1);
    assert!(store.export_table("00000").unwrap().is_empty());
}
