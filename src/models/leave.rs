//! Leave reference data, per-year balance ledger, and leave requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::intervals_overlap;

/// Reference data describing a kind of leave. Rarely mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Stable identifier (e.g. "ANNUAL").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Whether taking this leave debits a balance.
    pub is_paid: bool,
    /// Whether a supporting document is required.
    #[serde(default)]
    pub requires_document: bool,
    /// Annual entitlement in days, when the type has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_entitlement_days: Option<u32>,
}

/// Minute accounting for one (employee, leave code, year).
///
/// Invariant: `accrued + carry + adjusted - used >= 0` after every mutation.
/// The sum is signed and unclamped; `carry_minutes` may legitimately be
/// negative and simply participates in the sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The employee the balance belongs to.
    pub employee_id: String,
    /// The leave type code.
    pub leave_code: String,
    /// The calendar year the balance covers.
    pub year: i32,
    /// Minutes accrued from the entitlement.
    pub accrued_minutes: i64,
    /// Minutes carried over from the previous year.
    pub carry_minutes: i64,
    /// Net manual adjustments.
    pub adjusted_minutes: i64,
    /// Minutes consumed by approved leave.
    pub used_minutes: i64,
}

impl LeaveBalance {
    /// The remaining balance: `accrued + carry + adjusted - used`.
    pub fn remaining_minutes(&self) -> i64 {
        self.accrued_minutes + self.carry_minutes + self.adjusted_minutes - self.used_minutes
    }
}

/// The granularity a leave request is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveUnit {
    /// Whole local days, midnight to midnight, end date inclusive.
    Day,
    /// A half day inside a single date, defaulting to the configured window.
    HalfDay,
    /// An explicit time range inside a single date.
    Hour,
}

/// Lifecycle status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Awaiting a manager's decision.
    Pending,
    /// Granted; the ledger has been debited and conflicting shifts cancelled.
    Approved,
    /// Declined by a manager.
    Rejected,
    /// Withdrawn by the employee or removed by an admin.
    Cancelled,
}

/// A request to take leave over an instant interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The requesting employee.
    pub employee_id: String,
    /// The leave type code.
    pub leave_code: String,
    /// Granularity the request was expressed in.
    pub unit: LeaveUnit,
    /// Start instant.
    pub start_at: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: LeaveStatus,
    /// The employee's stated reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Note left by the deciding manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_note: Option<String>,
    /// When the request was approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    /// When the request was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    /// When the request was cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// The number of minutes the request spans.
    pub fn minutes(&self) -> i64 {
        (self.end_at - self.start_at).num_minutes()
    }

    /// Whether the request still occupies the employee's leave calendar
    /// (pending and approved requests block overlapping requests).
    pub fn blocks_overlap(&self) -> bool {
        matches!(self.status, LeaveStatus::Pending | LeaveStatus::Approved)
    }

    /// Half-open overlap test against an instant interval.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        intervals_overlap(self.start_at, self.end_at, start, end)
    }
}
