//! Shift model and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::intervals_overlap;

/// Lifecycle status of a shift.
///
/// A shift is never physically deleted; cancellation is the status
/// transition to `CANCELLED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    /// Created but not yet visible to the employee.
    Draft,
    /// Visible to the employee, awaiting acknowledgement.
    Published,
    /// The employee has confirmed the shift.
    Acknowledged,
    /// Ownership was transferred to another employee via a swap.
    Swapped,
    /// The shift no longer takes place.
    Cancelled,
}

/// A scheduled work shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: Uuid,
    /// The employee the shift belongs to.
    pub employee_id: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_time: DateTime<Utc>,
    /// Lifecycle status.
    pub status: ShiftStatus,
    /// Optional free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The leave request whose approval cancelled this shift, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by_leave: Option<Uuid>,
}

impl Shift {
    /// Duration of the shift in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Whether the shift still occupies the employee's calendar.
    ///
    /// Only cancelled shifts free their slot; a swapped shift keeps blocking
    /// the original owner's calendar for the double-booking scan.
    pub fn blocks_calendar(&self) -> bool {
        self.status != ShiftStatus::Cancelled
    }

    /// Whether the shift is still active for the employee (counts toward
    /// planned time and is subject to leave cascade cancellation).
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ShiftStatus::Draft | ShiftStatus::Published | ShiftStatus::Acknowledged
        )
    }

    /// Half-open overlap test against an instant interval.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        intervals_overlap(self.start_time, self.end_time, start, end)
    }
}
