//! Units of work and their outcomes

use crate::interval::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use terrascore_domain::ScoreSet;

/// One (county, window) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Position in the batch; results are reported in this order
    pub index: usize,
    /// County FIPS code
    pub county_fips: String,
    /// Imagery window
    pub window: DateWindow,
}

impl Task {
    /// The cross product of counties and windows, county-major
    pub fn cross(counties: &[String], windows: &[DateWindow]) -> Vec<Task> {
        counties
            .iter()
            .flat_map(|fips| windows.iter().map(move |w| (fips, *w)))
            .enumerate()
            .map(|(index, (fips, window))| Task {
                index,
                county_fips: fips.clone(),
                window,
            })
            .collect()
    }
}

/// How a task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Snapshot persisted
    Success,
    /// No qualifying imagery
    NoData,
    /// Samples could not be scored
    ProcessingFailed,
    /// The snapshot could not be written
    StorageFailed,
    /// Anything else, including worker setup failures and panics
    Error,
}

impl TaskStatus {
    /// Every status, in report order
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Success,
        TaskStatus::NoData,
        TaskStatus::ProcessingFailed,
        TaskStatus::StorageFailed,
        TaskStatus::Error,
    ];

    /// snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Success => "success",
            TaskStatus::NoData => "no_data",
            TaskStatus::ProcessingFailed => "processing_failed",
            TaskStatus::StorageFailed => "storage_failed",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// County FIPS code
    pub county_fips: String,
    /// First day of the window
    pub start_date: NaiveDate,
    /// Last day of the window
    pub end_date: NaiveDate,
    /// Outcome
    pub status: TaskStatus,
    /// Scores of a successful task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ScoreSet>,
    /// Failure message
    #[serde(default)]
    pub error: Option<String>,
    #[serde(skip)]
    pub(crate) index: usize,
}

impl TaskResult {
    /// A result without scores
    pub fn new(task: &Task, status: TaskStatus, error: Option<String>) -> Self {
        Self {
            county_fips: task.county_fips.clone(),
            start_date: task.window.start,
            end_date: task.window.end,
            status,
            metrics: None,
            error,
            index: task.index,
        }
    }

    /// A successful result carrying its scores
    pub fn success(task: &Task, metrics: Option<ScoreSet>) -> Self {
        Self {
            metrics,
            ..Self::new(task, TaskStatus::Success, None)
        }
    }

    /// A failed result
    pub fn failed(task: &Task, status: TaskStatus, error: impl fmt::Display) -> Self {
        Self::new(task, status, Some(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interval;

    #[test]
    fn test_cross_product_order() {
        let counties = vec!["06037".to_string(), "36061".to_string()];
        let windows = Interval::Monthly.partition(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        );
        let tasks = Task::cross(&counties, &windows);
        assert_eq!(tasks.len(), 6);
        assert_eq!(tasks[0].county_fips, "06037");
        assert_eq!(tasks[3].county_fips, "36061");
        assert_eq!(tasks[3].window, windows[0]);
        assert!(tasks.iter().enumerate().all(|(i, t)| t.index == i));
    }

    #[test]
    fn test_result_json_shape() {
        let task = Task {
            index: 0,
            county_fips: "06037".to_string(),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            ),
        };
        let value = serde_json::to_value(TaskResult::new(&task, TaskStatus::NoData, None)).unwrap();
        assert_eq!(value["status"], "no_data");
        assert_eq!(value["start_date"], "2023-01-01");
        assert!(value["error"].is_null());
        assert!(value.get("metrics").is_none());
    }
}
