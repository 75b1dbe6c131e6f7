//! The metrics record written for every processed sample set

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use terrascore_domain::{CollectionMetadata, ScoreSet, SnapshotMetadata};

/// Processing metadata carried alongside the scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// First day of the imagery window
    pub start_date: NaiveDate,
    /// Last day of the imagery window
    pub end_date: NaiveDate,
    /// Scenes that went into the composite
    pub image_count: usize,
    /// Samples that were scored
    pub sample_count: usize,
    /// `min(0.95, 0.5 + image_count / 20)`
    pub confidence: f64,
    /// Always "satellite"
    pub data_source: String,
}

/// Scores for one county and one collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// County FIPS code
    pub county_fips: String,
    /// County name
    pub county_name: String,
    /// State FIPS code
    pub state_fips: String,
    /// Collection timestamp (`YYYYMMDD_HHMMSS`)
    pub collection_date: String,
    /// The scores
    pub metrics: ScoreSet,
    /// Processing metadata
    pub metadata: RecordMetadata,
}

impl MetricsRecord {
    pub(crate) fn new(meta: &CollectionMetadata, metrics: ScoreSet, sample_count: usize) -> Self {
        Self {
            county_fips: meta.county_fips.clone(),
            county_name: meta.county_name.clone(),
            state_fips: meta.state_fips.clone(),
            collection_date: meta.collection_timestamp.clone(),
            metrics,
            metadata: RecordMetadata {
                start_date: meta.start_date,
                end_date: meta.end_date,
                image_count: meta.image_count,
                sample_count,
                confidence: confidence(meta.image_count),
                data_source: "satellite".to_string(),
            },
        }
    }

    /// Metadata to attach to the stored snapshot
    ///
    /// Window and sample count travel as extra keys.
    pub fn snapshot_metadata(&self) -> SnapshotMetadata {
        let mut extra = serde_json::Map::new();
        extra.insert(
            "start_date".to_string(),
            self.metadata.start_date.to_string().into(),
        );
        extra.insert(
            "end_date".to_string(),
            self.metadata.end_date.to_string().into(),
        );
        extra.insert(
            "sample_count".to_string(),
            self.metadata.sample_count.into(),
        );
        SnapshotMetadata {
            county_name: Some(self.county_name.clone()),
            state_fips: Some(self.state_fips.clone()),
            image_count: Some(self.metadata.image_count as u64),
            confidence: Some(self.metadata.confidence),
            data_source: Some(self.metadata.data_source.clone()),
            extra,
        }
    }

    /// File name of the record: `{county_fips}_{collection_date}_metrics.json`
    pub fn file_name(&self) -> String {
        format!("{}_{}_metrics.json", self.county_fips, self.collection_date)
    }
}

fn confidence(image_count: usize) -> f64 {
    (0.5 + image_count as f64 / 20.0).min(0.95)
}
