//! Batch summary and JSON report

use crate::interval::Interval;
use crate::task::{TaskResult, TaskStatus};
use crate::OrchestratorError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use terrascore_domain::Timestamp;
use tracing::info;
use uuid::Uuid;

/// Outcome of a whole batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Unique id of this run
    pub run_id: Uuid,
    /// First day covered
    pub start_date: Option<NaiveDate>,
    /// Last day covered
    pub end_date: Option<NaiveDate>,
    /// Partitioning, for historical runs
    pub interval: Option<Interval>,
    /// Counties requested
    pub counties: Vec<String>,
    /// Tasks run
    pub total_tasks: usize,
    /// Tasks that stored a snapshot
    pub success_count: usize,
    /// Tasks without qualifying imagery
    pub no_data_count: usize,
    /// Tasks whose samples could not be scored
    pub processing_failed_count: usize,
    /// Tasks whose snapshot could not be written
    pub storage_failed_count: usize,
    /// Tasks that failed otherwise
    pub error_count: usize,
    /// Wall-clock duration
    pub elapsed_secs: f64,
    /// When the batch finished
    pub timestamp: Timestamp,
    /// One entry per task, in task order
    pub results: Vec<TaskResult>,
}

impl BatchSummary {
    /// Tally results into a summary
    pub fn new(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        interval: Option<Interval>,
        counties: Vec<String>,
        results: Vec<TaskResult>,
        elapsed: Duration,
    ) -> Self {
        let count = |status: TaskStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            run_id: Uuid::now_v7(),
            start_date,
            end_date,
            interval,
            counties,
            total_tasks: results.len(),
            success_count: count(TaskStatus::Success),
            no_data_count: count(TaskStatus::NoData),
            processing_failed_count: count(TaskStatus::ProcessingFailed),
            storage_failed_count: count(TaskStatus::StorageFailed),
            error_count: count(TaskStatus::Error),
            elapsed_secs: elapsed.as_secs_f64(),
            timestamp: Timestamp::now(),
            results,
        }
    }

    /// Number of tasks that ended with `status`
    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Success => self.success_count,
            TaskStatus::NoData => self.no_data_count,
            TaskStatus::ProcessingFailed => self.processing_failed_count,
            TaskStatus::StorageFailed => self.storage_failed_count,
            TaskStatus::Error => self.error_count,
        }
    }

    /// Tasks that did not succeed
    pub fn failed_count(&self) -> usize {
        self.total_tasks - self.success_count
    }

    /// `historical_summary_{YYYYMMDD_HHMMSS}.json`
    pub fn report_file_name(&self) -> String {
        format!("historical_summary_{}.json", self.timestamp.collection_stamp())
    }

    /// Write the report into `reports_dir`, creating it if needed
    pub fn write(&self, reports_dir: &Path) -> Result<PathBuf, OrchestratorError> {
        fs::create_dir_all(reports_dir)?;
        let path = reports_dir.join(self.report_file_name());
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Summary saved");
        Ok(path)
    }

    /// Emit the one-line batch summary
    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            total = self.total_tasks,
            success = self.success_count,
            no_data = self.no_data_count,
            processing_failed = self.processing_failed_count,
            storage_failed = self.storage_failed_count,
            error = self.error_count,
            elapsed_secs = self.elapsed_secs,
            "Batch completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::DateWindow;
    use crate::task::Task;

    fn results() -> Vec<TaskResult> {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        );
        let statuses = [
            TaskStatus::Success,
            TaskStatus::Success,
            TaskStatus::NoData,
            TaskStatus::StorageFailed,
            TaskStatus::Error,
        ];
        statuses
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let task = Task {
                    index,
                    county_fips: "06037".to_string(),
                    window,
                };
                TaskResult::new(&task, *status, None)
            })
            .collect()
    }

    #[test]
    fn test_counts() {
        let summary = BatchSummary::new(
            None,
            None,
            Some(Interval::Quarterly),
            vec!["06037".to_string()],
            results(),
            Duration::from_millis(1500),
        );
        assert_eq!(summary.total_tasks, 5);
        assert_eq!(summary.count(TaskStatus::Success), 2);
        assert_eq!(summary.count(TaskStatus::NoData), 1);
        assert_eq!(summary.count(TaskStatus::ProcessingFailed), 0);
        assert_eq!(summary.failed_count(), 3);
        assert_eq!(summary.elapsed_secs, 1.5);
        assert_eq!(summary.run_id.get_version_num(), 7);
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let summary = BatchSummary::new(
            NaiveDate::from_ymd_opt(2023, 1, 1),
            NaiveDate::from_ymd_opt(2023, 12, 31),
            Some(Interval::Quarterly),
            vec!["06037".to_string()],
            results(),
            Duration::from_secs(2),
        );

        let path = summary.write(&dir.path().join("reports")).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("historical_summary_"));
        assert!(name.ends_with(".json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["interval"], "quarterly");
        assert_eq!(value["no_data_count"], 1);
        assert_eq!(value["results"].as_array().unwrap().len(), 5);
        assert_eq!(value["start_date"], "2023-01-01");
    }
}
