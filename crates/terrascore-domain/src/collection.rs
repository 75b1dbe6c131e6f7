//! Metadata written alongside every raw sample file

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Contents of a raw collection's `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// County FIPS code
    pub county_fips: String,
    /// County name
    pub county_name: String,
    /// State FIPS code
    pub state_fips: String,
    /// First day of the imagery window
    pub start_date: NaiveDate,
    /// Last day of the imagery window
    pub end_date: NaiveDate,
    /// When the collection ran (`YYYYMMDD_HHMMSS`)
    pub collection_timestamp: String,
    /// Scenes that went into the composite
    pub image_count: usize,
}
