//! Tabular export of a county series

use serde_json::Value;
use terrascore_domain::{CountyTimeSeries, MetricName};

/// A county series flattened to rows
///
/// Columns are `timestamp`, the three metric names, then `meta_<key>` for every
/// metadata key seen in any snapshot (in first-seen order). Rows follow the series
/// order, which is ascending by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    /// Column names
    pub columns: Vec<String>,
    /// One row per snapshot, aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl SeriesTable {
    /// Flatten a series
    pub fn from_series(series: &CountyTimeSeries) -> Self {
        let mut columns: Vec<String> = vec!["timestamp".to_string()];
        columns.extend(MetricName::ALL.iter().map(|m| m.as_str().to_string()));

        let metadata: Vec<_> = series
            .data_points
            .iter()
            .map(|p| p.metadata.to_map())
            .collect();
        for map in &metadata {
            for key in map.keys() {
                let column = format!("meta_{}", key);
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }

        let rows = series
            .data_points
            .iter()
            .zip(&metadata)
            .map(|(point, meta)| {
                columns
                    .iter()
                    .map(|column| {
                        if column == "timestamp" {
                            return Value::String(point.timestamp.to_string());
                        }
                        if let Ok(metric) = column.parse::<MetricName>() {
                            return point.metrics.get(metric).map(Value::from).unwrap_or(Value::Null);
                        }
                        column
                            .strip_prefix("meta_")
                            .and_then(|key| meta.get(key))
                            .cloned()
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Render as CSV; nulls become empty fields
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_text))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrascore_domain::{MetricSnapshot, ScoreSet, SnapshotMetadata, Timestamp};

    fn series() -> CountyTimeSeries {
        let mut series = CountyTimeSeries::empty("06037");
        series.append(MetricSnapshot {
            timestamp: Timestamp::parse("2023-02-01").unwrap(),
            metrics: ScoreSet::new(Some(0.5), None),
            metadata: SnapshotMetadata {
                county_name: Some("Los Angeles".to_string()),
                ..Default::default()
            },
        });
        series.append(MetricSnapshot {
            timestamp: Timestamp::parse("2023-01-01").unwrap(),
            metrics: ScoreSet::new(Some(0.25), Some(0.5)),
            metadata: SnapshotMetadata {
                image_count: Some(3),
                ..Default::default()
            },
        });
        series
    }

    #[test]
    fn test_columns_and_rows() {
        let table = SeriesTable::from_series(&series());
        assert_eq!(
            &table.columns[..4],
            &["timestamp", "obsolescence_score", "growth_potential_score", "bivariate_score"]
        );
        assert!(table.columns.contains(&"meta_image_count".to_string()));
        assert!(table.columns.contains(&"meta_county_name".to_string()));
        assert_eq!(table.rows.len(), 2);

        let stamps = table.column("timestamp").unwrap();
        assert_eq!(stamps[0], "2023-01-01T00:00:00");
        let bivariate = table.column("bivariate_score").unwrap();
        assert_eq!(bivariate[0], &Value::from(0.125));
        assert!(bivariate[1].is_null());
    }

    #[test]
    fn test_csv_rendering() {
        let csv = SeriesTable::from_series(&series()).to_csv().unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("timestamp,obsolescence_score"));
        assert!(lines.next().unwrap().starts_with("2023-01-01T00:00:00,0.25,0.5,0.125"));
    }

    #[test]
    fn test_empty_series() {
        let table = SeriesTable::from_series(&CountyTimeSeries::empty("x"));
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 4);
    }
}
