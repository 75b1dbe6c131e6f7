//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use terrascore_domain::CountyTimeSeries;
use terrascore_orchestrator::{BatchSummary, TaskStatus};
use terrascore_query::CountySummary;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a batch summary.
    pub fn format_summary(&self, summary: &BatchSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
            OutputFormat::Table => Ok(self.format_summary_table(summary)),
            OutputFormat::Quiet => Ok(format!(
                "{} {}",
                summary.success_count, summary.total_tasks
            )),
        }
    }

    fn format_summary_table(&self, summary: &BatchSummary) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Outcome", "Tasks"]);
        for status in TaskStatus::ALL {
            builder.push_record([status.to_string(), summary.count(status).to_string()]);
        }
        builder.push_record(["total".to_string(), summary.total_tasks.to_string()]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut out = table.to_string();

        let failures: Vec<_> = summary
            .results
            .iter()
            .filter(|r| r.status != TaskStatus::Success && r.status != TaskStatus::NoData)
            .collect();
        if !failures.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["County", "Window", "Status", "Error"]);
            for result in failures {
                builder.push_record([
                    result.county_fips.clone(),
                    format!("{} to {}", result.start_date, result.end_date),
                    result.status.to_string(),
                    result.error.clone().unwrap_or_default(),
                ]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            out.push('\n');
            out.push_str(&table.to_string());
        }

        let line = format!(
            "Run {} finished in {:.1}s: {} of {} tasks stored",
            summary.run_id, summary.elapsed_secs, summary.success_count, summary.total_tasks
        );
        out.push('\n');
        if summary.failed_count() == summary.no_data_count {
            out.push_str(&self.success(&line));
        } else {
            out.push_str(&self.warning(&line));
        }
        out
    }

    /// Format a county's time series.
    pub fn format_series(&self, series: &CountyTimeSeries) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(series)?),
            OutputFormat::Quiet => Ok(series
                .data_points
                .iter()
                .map(|p| p.timestamp.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if series.is_empty() {
                    return Ok(self.colorize("No data points in range.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Timestamp", "Obsolescence", "Growth", "Bivariate"]);
                for point in &series.data_points {
                    builder.push_record([
                        point.timestamp.to_string(),
                        score(point.metrics.obsolescence_score),
                        score(point.metrics.growth_potential_score),
                        score(point.metrics.bivariate_score),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let title = match series.county_name() {
                    Some(name) => format!("{} ({})", series.county_fips, name),
                    None => series.county_fips.clone(),
                };
                Ok(format!("{}\n{}", self.colorize(&title, "cyan"), table))
            }
        }
    }

    /// Format the stored-county listing.
    pub fn format_counties(&self, counties: &[CountySummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(counties)?),
            OutputFormat::Quiet => Ok(counties
                .iter()
                .map(|c| c.county_fips.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if counties.is_empty() {
                    return Ok(self.colorize("No counties found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["FIPS", "Name", "State", "Points", "Latest"]);
                for county in counties {
                    builder.push_record([
                        county.county_fips.clone(),
                        county.county_name.clone().unwrap_or_default(),
                        county.state_fips.clone().unwrap_or_default(),
                        county.data_point_count.to_string(),
                        county
                            .latest_timestamp
                            .map(|t| t.to_string())
                            .unwrap_or_default(),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Report where a file was written.
    pub fn written(&self, what: &str, path: &Path) -> String {
        self.info(&format!("{} written to {}", what, path.display()))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use terrascore_domain::{MetricSnapshot, ScoreSet, SnapshotMetadata, Timestamp};
    use terrascore_orchestrator::{DateWindow, Task, TaskResult};

    fn summary() -> BatchSummary {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        );
        let task = |index, fips: &str| Task {
            index,
            county_fips: fips.to_string(),
            window,
        };
        let results = vec![
            TaskResult::success(&task(0, "06037"), Some(ScoreSet::new(Some(0.5), Some(0.5)))),
            TaskResult::new(&task(1, "36061"), TaskStatus::NoData, None),
            TaskResult::failed(&task(2, "99999"), TaskStatus::Error, "County not found: 99999"),
        ];
        BatchSummary::new(
            Some(window.start),
            Some(window.end),
            None,
            vec!["06037".to_string(), "36061".to_string(), "99999".to_string()],
            results,
            Duration::from_secs(3),
        )
    }

    fn series() -> CountyTimeSeries {
        let mut series = CountyTimeSeries::empty("06037");
        series.append(MetricSnapshot {
            timestamp: Timestamp::parse("2023-02-14T12:00:00").unwrap(),
            metrics: ScoreSet::new(Some(0.62), Some(0.41)),
            metadata: SnapshotMetadata {
                county_name: Some("Los Angeles".to_string()),
                ..Default::default()
            },
        });
        series
    }

    #[test]
    fn test_summary_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_summary(&summary()).unwrap();
        assert!(output.contains("no_data"));
        assert!(output.contains("County not found: 99999"));
        assert!(output.contains("1 of 3 tasks stored"));
        assert!(output.contains("⚠"));
    }

    #[test]
    fn test_summary_json_and_quiet() {
        let json = Formatter::new(OutputFormat::Json, false)
            .format_summary(&summary())
            .unwrap();
        assert!(json.contains("\"error_count\": 1"));

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_summary(&summary())
            .unwrap();
        assert_eq!(quiet, "1 3");
    }

    #[test]
    fn test_series_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_series(&series()).unwrap();
        assert!(output.contains("06037 (Los Angeles)"));
        assert!(output.contains("0.6200"));
        assert!(output.contains("0.2542"));
    }

    #[test]
    fn test_empty_counties() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_counties(&[]).unwrap();
        assert!(output.contains("No counties found"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
