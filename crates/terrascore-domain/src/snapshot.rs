//! Metric snapshots and per-county time series

use crate::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Names of the three derived scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    /// Likely infrastructure decline
    ObsolescenceScore,
    /// Favorable conditions for development
    GrowthPotentialScore,
    /// Product of the two
    BivariateScore,
}

impl MetricName {
    /// All metrics, in column order
    pub const ALL: [MetricName; 3] = [
        MetricName::ObsolescenceScore,
        MetricName::GrowthPotentialScore,
        MetricName::BivariateScore,
    ];

    /// Field name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ObsolescenceScore => "obsolescence_score",
            MetricName::GrowthPotentialScore => "growth_potential_score",
            MetricName::BivariateScore => "bivariate_score",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "obsolescence_score" => Ok(MetricName::ObsolescenceScore),
            "growth_potential_score" => Ok(MetricName::GrowthPotentialScore),
            "bivariate_score" => Ok(MetricName::BivariateScore),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}

/// The three scores of a snapshot; each lies in [0, 1] or is absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    /// Obsolescence score
    #[serde(default)]
    pub obsolescence_score: Option<f64>,
    /// Growth potential score
    #[serde(default)]
    pub growth_potential_score: Option<f64>,
    /// Bivariate score
    #[serde(default)]
    pub bivariate_score: Option<f64>,
}

impl ScoreSet {
    /// Build a score set, deriving the bivariate score as the product of the other two
    pub fn new(obsolescence: Option<f64>, growth_potential: Option<f64>) -> Self {
        let bivariate = match (obsolescence, growth_potential) {
            (Some(o), Some(g)) => Some(o * g),
            _ => None,
        };
        Self {
            obsolescence_score: obsolescence,
            growth_potential_score: growth_potential,
            bivariate_score: bivariate,
        }
    }

    /// Value of a named metric
    pub fn get(&self, metric: MetricName) -> Option<f64> {
        match metric {
            MetricName::ObsolescenceScore => self.obsolescence_score,
            MetricName::GrowthPotentialScore => self.growth_potential_score,
            MetricName::BivariateScore => self.bivariate_score,
        }
    }

    /// Whether every present score lies in [0, 1]
    pub fn in_unit_range(&self) -> bool {
        MetricName::ALL
            .iter()
            .filter_map(|m| self.get(*m))
            .all(|v| (0.0..=1.0).contains(&v))
    }
}

/// Descriptive metadata attached to a snapshot
///
/// Known keys are typed; anything else a producer attaches is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// County name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county_name: Option<String>,
    /// State FIPS code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_fips: Option<String>,
    /// Number of scenes that went into the composite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u64>,
    /// Confidence in the scores, [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Provenance label ("satellite")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Any other metadata
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SnapshotMetadata {
    /// Flatten to a JSON object (known keys first, then extras)
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Scores for one county at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Normalized timestamp
    pub timestamp: Timestamp,
    /// The scores
    pub metrics: ScoreSet,
    /// Descriptive metadata
    #[serde(default)]
    pub metadata: SnapshotMetadata,
}

/// Ordered snapshots for one county
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyTimeSeries {
    /// County FIPS code (primary key)
    pub county_fips: String,
    /// Snapshots sorted ascending by timestamp
    #[serde(default)]
    pub data_points: Vec<MetricSnapshot>,
}

impl CountyTimeSeries {
    /// An empty series for a county
    pub fn empty(county_fips: impl Into<String>) -> Self {
        Self {
            county_fips: county_fips.into(),
            data_points: Vec::new(),
        }
    }

    /// Number of snapshots
    pub fn len(&self) -> usize {
        self.data_points.len()
    }

    /// Whether the series has no snapshots
    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }

    /// Append a snapshot and restore timestamp order
    ///
    /// The sort is stable, so snapshots sharing a timestamp keep insertion order.
    pub fn append(&mut self, snapshot: MetricSnapshot) {
        self.data_points.push(snapshot);
        self.sort();
    }

    /// Stable sort by timestamp
    pub fn sort(&mut self) {
        self.data_points.sort_by_key(|p| p.timestamp);
    }

    /// Snapshot with the greatest timestamp
    pub fn latest(&self) -> Option<&MetricSnapshot> {
        // max_by_key returns the last of equal maxima, matching a sort-then-take-last
        self.data_points.iter().max_by_key(|p| p.timestamp)
    }

    /// Snapshots with `start <= timestamp <= end`
    pub fn within(&self, start: Timestamp, end: Timestamp) -> Vec<MetricSnapshot> {
        self.data_points
            .iter()
            .filter(|p| start <= p.timestamp && p.timestamp <= end)
            .cloned()
            .collect()
    }

    /// Snapshot closest in time to `target`, with its distance
    ///
    /// Ties go to the earliest snapshot.
    pub fn closest_to(&self, target: Timestamp) -> Option<(&MetricSnapshot, Duration)> {
        let mut best: Option<(&MetricSnapshot, Duration)> = None;
        for point in &self.data_points {
            let diff = point.timestamp.abs_diff(&target);
            if best.map_or(true, |(_, d)| diff < d) {
                best = Some((point, diff));
            }
        }
        best
    }

    /// County name recorded in the first snapshot's metadata
    pub fn county_name(&self) -> Option<&str> {
        self.data_points.first()?.metadata.county_name.as_deref()
    }

    /// State FIPS recorded in the first snapshot's metadata
    pub fn state_fips(&self) -> Option<&str> {
        self.data_points.first()?.metadata.state_fips.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ts: &str, obs: f64) -> MetricSnapshot {
        MetricSnapshot {
            timestamp: Timestamp::parse(ts).unwrap(),
            metrics: ScoreSet::new(Some(obs), Some(0.5)),
            metadata: SnapshotMetadata::default(),
        }
    }

    #[test]
    fn test_bivariate_is_product() {
        let scores = ScoreSet::new(Some(0.62), Some(0.41));
        assert_eq!(scores.bivariate_score, Some(0.62 * 0.41));
        assert!(scores.in_unit_range());
    }

    #[test]
    fn test_bivariate_with_zero_score() {
        let scores = ScoreSet::new(Some(0.0), Some(0.7));
        assert_eq!(scores.bivariate_score, Some(0.0));
    }

    #[test]
    fn test_bivariate_absent_when_input_absent() {
        let scores = ScoreSet::new(None, Some(0.7));
        assert_eq!(scores.bivariate_score, None);
    }

    #[test]
    fn test_scores_serialize_null() {
        let json = serde_json::to_value(ScoreSet::new(None, None)).unwrap();
        assert!(json["obsolescence_score"].is_null());
        assert!(json.get("bivariate_score").is_some());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut series = CountyTimeSeries::empty("06037");
        series.append(snapshot("2023-06-01", 0.3));
        series.append(snapshot("2023-01-01", 0.1));
        series.append(snapshot("2023-03-01", 0.2));

        let stamps: Vec<String> = series
            .data_points
            .iter()
            .map(|p| p.timestamp.to_string())
            .collect();
        assert_eq!(
            stamps,
            vec!["2023-01-01T00:00:00", "2023-03-01T00:00:00", "2023-06-01T00:00:00"]
        );
        assert_eq!(series.latest().unwrap().metrics.obsolescence_score, Some(0.3));
    }

    #[test]
    fn test_within_is_inclusive() {
        let mut series = CountyTimeSeries::empty("06037");
        series.append(snapshot("2023-01-01", 0.1));
        series.append(snapshot("2023-02-01", 0.2));
        series.append(snapshot("2023-03-01", 0.3));

        let hits = series.within(
            Timestamp::parse("2023-01-01").unwrap(),
            Timestamp::parse("2023-02-01").unwrap(),
        );
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_closest_to() {
        let mut series = CountyTimeSeries::empty("06037");
        series.append(snapshot("2023-01-01", 0.1));
        series.append(snapshot("2023-03-01", 0.3));

        let (point, diff) = series
            .closest_to(Timestamp::parse("2023-02-20").unwrap())
            .unwrap();
        assert_eq!(point.metrics.obsolescence_score, Some(0.3));
        assert_eq!(diff, Duration::days(9));
        assert!(CountyTimeSeries::empty("x").closest_to(Timestamp::now()).is_none());
    }

    #[test]
    fn test_metadata_extras_round_trip() {
        let raw = r#"{"county_name":"Los Angeles","image_count":4,"start_date":"2023-01-01"}"#;
        let meta: SnapshotMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.county_name.as_deref(), Some("Los Angeles"));
        assert_eq!(meta.image_count, Some(4));
        assert_eq!(meta.extra["start_date"], "2023-01-01");

        let map = meta.to_map();
        assert_eq!(map["start_date"], "2023-01-01");
        assert!(!map.contains_key("confidence"));
    }

    #[test]
    fn test_metric_name_parse() {
        for metric in MetricName::ALL {
            assert_eq!(metric.as_str().parse::<MetricName>().unwrap(), metric);
        }
        assert!("ndvi".parse::<MetricName>().is_err());
    }
}
