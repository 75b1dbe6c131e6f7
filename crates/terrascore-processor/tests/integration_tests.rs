//! Integration tests for terrascore-processor

use chrono::NaiveDate;
use proptest::prelude::*;
use std::fs;
use terrascore_domain::{CollectionMetadata, IndexSample, SampleSet, SpectralIndex};
use terrascore_processor::{MetricsProcessor, MetricsRecord, ProcessorConfig, ProcessorError};

fn metadata() -> CollectionMetadata {
    CollectionMetadata {
        county_fips: "06037".to_string(),
        county_name: "Los Angeles".to_string(),
        state_fips: "06".to_string(),
        start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        collection_timestamp: "20230401_120000".to_string(),
        image_count: 5,
    }
}

fn full_sample(ndvi: f64, ndbi: f64, ndwi: f64, mndwi: f64) -> IndexSample {
    IndexSample::new(-118.25, 34.05)
        .with(SpectralIndex::Ndvi, ndvi)
        .with(SpectralIndex::Ndbi, ndbi)
        .with(SpectralIndex::Ndwi, ndwi)
        .with(SpectralIndex::Mndwi, mndwi)
        .with(SpectralIndex::Ui, 0.05)
        .with(SpectralIndex::Bsi, -0.1)
}

#[test]
fn test_uniform_peak_sample_set() {
    let dir = tempfile::tempdir().unwrap();
    let processor = MetricsProcessor::with_output_dir(ProcessorConfig::default(), dir.path());

    for water in [-0.4, 0.0, 0.35, 1.0] {
        let set = SampleSet::from_samples(vec![full_sample(0.5, 0.3, water, water - 0.1); 12]);
        let record = processor.process(&set, &metadata()).unwrap().unwrap();

        let water_term = water.clamp(0.0, 1.0);
        let expected = (0.4 + 0.4 + 0.2 * water_term).clamp(0.0, 1.0);
        let growth = record.metrics.growth_potential_score.unwrap();
        assert!((growth - expected).abs() < 1e-9, "water {}: {}", water, growth);
    }
}

#[test]
fn test_empty_sample_set_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let processor = MetricsProcessor::with_output_dir(ProcessorConfig::default(), dir.path());

    let set = SampleSet::with_bands(SpectralIndex::ALL);
    let result = processor.process(&set, &metadata()).unwrap();
    assert!(result.is_none());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_indices_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let processor = MetricsProcessor::with_output_dir(ProcessorConfig::default(), dir.path());

    let set = SampleSet::from_samples(vec![IndexSample::new(0.0, 0.0).with(SpectralIndex::Ndvi, 0.4)]);
    assert!(processor.process(&set, &metadata()).unwrap().is_none());
}

#[test]
fn test_record_written_to_processed_dir() {
    let dir = tempfile::tempdir().unwrap();
    let processor = MetricsProcessor::with_output_dir(ProcessorConfig::default(), dir.path());

    let set = SampleSet::from_samples(vec![full_sample(0.2, 0.1, 0.0, 0.0)]);
    let record = processor.process(&set, &metadata()).unwrap().unwrap();

    let path = dir.path().join("06037_20230401_120000_metrics.json");
    assert_eq!(processor.record_path(&record), path);
    let on_disk: MetricsRecord = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, record);
    assert!((on_disk.metadata.confidence - 0.75).abs() < 1e-12);
    assert_eq!(on_disk.metadata.sample_count, 1);
}

#[test]
fn test_process_file_infers_metadata() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let processor = MetricsProcessor::with_output_dir(ProcessorConfig::default(), out.path());

    let collection_dir = raw.path().join("06037_20230401_120000");
    fs::create_dir_all(&collection_dir).unwrap();
    let sample_path = collection_dir.join("06037_samples.geojson");
    let set = SampleSet::from_samples(vec![full_sample(0.3, 0.2, 0.1, 0.0); 3]);
    fs::write(&sample_path, set.to_geojson().to_string()).unwrap();
    fs::write(
        collection_dir.join("metadata.json"),
        serde_json::to_string(&metadata()).unwrap(),
    )
    .unwrap();

    let record = processor.process_file(&sample_path, None).unwrap().unwrap();
    assert_eq!(record.county_fips, "06037");
    assert_eq!(record.metadata.sample_count, 3);

    // Missing metadata is an I/O error
    let stray = raw.path().join("stray_samples.geojson");
    fs::write(&stray, set.to_geojson().to_string()).unwrap();
    assert!(processor.process_file(&stray, None).is_err());

    let records = processor.process_bulk(&[sample_path, stray]);
    assert_eq!(records.len(), 1);
}

#[test]
fn test_process_file_error_variants() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let processor = MetricsProcessor::with_output_dir(ProcessorConfig::default(), out.path());
    fs::write(
        raw.path().join("metadata.json"),
        serde_json::to_string(&metadata()).unwrap(),
    )
    .unwrap();

    let not_collection = raw.path().join("bad_samples.geojson");
    fs::write(&not_collection, r#"{"type": "Feature"}"#).unwrap();
    assert!(matches!(
        processor.process_file(&not_collection, None),
        Err(ProcessorError::InvalidSamples(_))
    ));

    let not_json = raw.path().join("garbled_samples.geojson");
    fs::write(&not_json, "not json").unwrap();
    assert!(matches!(
        processor.process_file(&not_json, None),
        Err(ProcessorError::Json(_))
    ));

    assert!(matches!(
        processor.process_file(&raw.path().join("absent.geojson"), None),
        Err(ProcessorError::Io(_))
    ));
}

proptest! {
    #[test]
    fn prop_scores_within_unit_range(
        values in prop::collection::vec(
            (-3.0f64..3.0, -3.0f64..3.0, -3.0f64..3.0, -3.0f64..3.0),
            1..40,
        )
    ) {
        let samples = values
            .into_iter()
            .map(|(a, b, c, d)| full_sample(a, b, c, d))
            .collect();
        let set = SampleSet::from_samples(samples);
        let scores = MetricsProcessor::new(ProcessorConfig::default())
            .compute_scores(&set)
            .unwrap();

        let obs = scores.obsolescence_score.unwrap();
        let growth = scores.growth_potential_score.unwrap();
        prop_assert!((0.0..=1.0).contains(&obs));
        prop_assert!((0.0..=1.0).contains(&growth));
        prop_assert_eq!(scores.bivariate_score, Some(obs * growth));
    }
}
