//! Weekly overtime snapshots and clock entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which source of truth a weekly total is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OvertimeStrategy {
    /// Scheduled shift minutes.
    Planned,
    /// Clocked time-entry minutes.
    Actual,
}

impl std::fmt::Display for OvertimeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OvertimeStrategy::Planned => write!(f, "PLANNED"),
            OvertimeStrategy::Actual => write!(f, "ACTUAL"),
        }
    }
}

/// A derived weekly overtime snapshot for one employee.
///
/// Keyed by (employee, week start, strategy). Not authoritative: shifts and
/// time entries are, and the snapshot is recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeRecord {
    /// The employee the snapshot covers.
    pub employee_id: String,
    /// Local date the week starts on.
    pub week_start: NaiveDate,
    /// Which totals this snapshot was computed from.
    pub strategy: OvertimeStrategy,
    /// Scheduled minutes in the week.
    pub planned_minutes: i64,
    /// Clocked minutes in the week.
    pub actual_minutes: i64,
    /// Minutes up to the employee's weekly cap.
    pub regular_minutes: i64,
    /// Minutes beyond the cap.
    pub overtime_minutes: i64,
    /// The multiplier used for the overtime portion.
    pub overtime_multiplier: Decimal,
    /// Estimated pay for the week, rounded to 2 decimals.
    pub estimated_pay: Decimal,
}

/// A clock-in/clock-out record. Only closed entries (with a clock-out) count
/// toward ACTUAL weekly totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The employee who clocked in.
    pub employee_id: String,
    /// Clock-in instant.
    pub clock_in: DateTime<Utc>,
    /// Clock-out instant; absent while the entry is still open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<DateTime<Utc>>,
}

impl TimeEntry {
    /// Minutes between clock-in and clock-out, or `None` while open.
    pub fn closed_minutes(&self) -> Option<i64> {
        self.clock_out.map(|out| (out - self.clock_in).num_minutes())
    }
}
