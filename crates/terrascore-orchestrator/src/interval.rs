//! Date windows and their partitioning into sub-intervals

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the sub-intervals a date range is split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// One day
    Daily,
    /// Seven days
    Weekly,
    /// One calendar month
    Monthly,
    /// Three calendar months
    Quarterly,
    /// One calendar year
    Yearly,
}

impl Interval {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
            Interval::Quarterly => "quarterly",
            Interval::Yearly => "yearly",
        }
    }

    /// Start of the `n`th sub-interval counted from `origin`
    ///
    /// Month arithmetic is anchored at `origin` so that day-of-month clamping in
    /// short months does not accumulate.
    fn nth_start(&self, origin: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Interval::Daily => origin.checked_add_days(Days::new(u64::from(n))),
            Interval::Weekly => origin.checked_add_days(Days::new(7 * u64::from(n))),
            Interval::Monthly => origin.checked_add_months(Months::new(n)),
            Interval::Quarterly => origin.checked_add_months(Months::new(3 * n)),
            Interval::Yearly => origin.checked_add_months(Months::new(12 * n)),
        }
    }

    /// Split `[start, end]` (inclusive) into consecutive windows
    ///
    /// Each window ends the day before the next begins; the last one is clipped to
    /// `end`. An inverted range yields no windows.
    pub fn partition(&self, start: NaiveDate, end: NaiveDate) -> Vec<DateWindow> {
        let mut windows = Vec::new();
        let mut n = 0;
        let mut current = start;

        while current <= end {
            let Some(next) = self.nth_start(start, n + 1) else {
                windows.push(DateWindow::new(current, end));
                break;
            };
            let last = next.pred_opt().unwrap_or(next).min(end);
            windows.push(DateWindow::new(current, last));
            current = next;
            n += 1;
        }
        windows
    }

    /// Default start of a single collection window ending `today`
    pub fn default_start(&self, today: NaiveDate) -> NaiveDate {
        let days = match self {
            Interval::Daily => 1,
            Interval::Monthly => 30,
            _ => 7,
        };
        today.checked_sub_days(Days::new(days)).unwrap_or(today)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Interval::Daily),
            "weekly" => Ok(Interval::Weekly),
            "monthly" => Ok(Interval::Monthly),
            "quarterly" => Ok(Interval::Quarterly),
            "yearly" => Ok(Interval::Yearly),
            other => Err(format!(
                "Unknown interval '{}'. Valid: daily, weekly, monthly, quarterly, yearly",
                other
            )),
        }
    }
}

/// An inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day
    pub start: NaiveDate,
    /// Last day
    pub end: NaiveDate,
}

impl DateWindow {
    /// A window from `start` to `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Halfway between the two midnights
    pub fn midpoint(&self) -> NaiveDateTime {
        let start = self.start.and_time(NaiveTime::MIN);
        let end = self.end.and_time(NaiveTime::MIN);
        start + (end - start) / 2
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
