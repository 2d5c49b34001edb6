//! Request types for the roster engine API.
//!
//! This module defines the deserialized request bodies and query strings,
//! with conversions into the engine's input types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::{NewLeaveRequest, NewShift, ShiftPatch};
use crate::models::{LeaveStatus, LeaveUnit, OvertimeStrategy};

/// Body of `POST /shifts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShiftRequest {
    /// The employee to schedule.
    pub employee_id: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_time: DateTime<Utc>,
    /// Optional free-form note.
    #[serde(default)]
    pub note: Option<String>,
    /// Downgrade blocking availability conflicts to warnings.
    #[serde(default)]
    pub force_override: bool,
}

impl From<CreateShiftRequest> for NewShift {
    fn from(request: CreateShiftRequest) -> Self {
        NewShift {
            employee_id: request.employee_id,
            start_time: request.start_time,
            end_time: request.end_time,
            note: request.note,
            force_override: request.force_override,
        }
    }
}

/// Body of `PATCH /shifts/{id}`; absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateShiftRequest {
    /// New start instant.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// New end instant.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// New note.
    #[serde(default)]
    pub note: Option<String>,
    /// Override flag for the re-validation pass.
    #[serde(default)]
    pub force_override: bool,
}

impl From<UpdateShiftRequest> for ShiftPatch {
    fn from(request: UpdateShiftRequest) -> Self {
        ShiftPatch {
            start_time: request.start_time,
            end_time: request.end_time,
            note: request.note,
            force_override: request.force_override,
        }
    }
}

/// Body of `POST /shifts/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    /// The shifts to create, validated independently.
    pub shifts: Vec<CreateShiftRequest>,
}

/// Body of `POST /shifts/copy-week`.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyWeekRequest {
    /// Monday of the week to copy from.
    pub source_week_start: NaiveDate,
    /// Monday of the week to copy into.
    pub target_week_start: NaiveDate,
}

/// Query string of `GET /shifts`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ShiftsQuery {
    /// Restrict to shifts ending after this instant.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Restrict to shifts starting before this instant.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// Body of `POST /leave-requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeaveRequest {
    /// The employee taking leave; defaults to the actor.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// The leave type code.
    pub leave_code: String,
    /// Granularity of the request.
    pub unit: LeaveUnit,
    /// First local date of the leave.
    pub start_date: NaiveDate,
    /// Last local date of the leave.
    pub end_date: NaiveDate,
    /// Local start time; required for HOUR.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// Local end time; required for HOUR.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// The employee's stated reason.
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<CreateLeaveRequest> for NewLeaveRequest {
    fn from(request: CreateLeaveRequest) -> Self {
        NewLeaveRequest {
            employee_id: request.employee_id,
            leave_code: request.leave_code,
            unit: request.unit,
            start_date: request.start_date,
            end_date: request.end_date,
            start_time: request.start_time,
            end_time: request.end_time,
            reason: request.reason,
        }
    }
}

/// Body of `PATCH /leave-requests/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLeaveStatusRequest {
    /// The target status.
    pub status: LeaveStatus,
    /// Manager note recorded with an approval or rejection.
    #[serde(default)]
    pub manager_note: Option<String>,
}

/// Query string of `GET /leave-requests`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LeaveRequestsQuery {
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Restrict to one status.
    #[serde(default)]
    pub status: Option<LeaveStatus>,
}

/// Body of `POST /leave-balances/adjust`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustBalanceRequest {
    /// The employee whose balance row is adjusted.
    pub employee_id: String,
    /// The leave type code of the row.
    pub leave_code: String,
    /// The ledger year of the row.
    pub year: i32,
    /// Signed minutes to add to the adjusted component.
    pub delta_minutes: i64,
    /// Reason recorded in the audit log.
    pub reason: String,
}

/// Query string of `GET /leave-balances`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BalancesQuery {
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Restrict to one ledger year.
    #[serde(default)]
    pub year: Option<i32>,
}

/// Body of `POST /swaps`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSwapRequest {
    /// The shift to swap away.
    pub shift_id: Uuid,
    /// The colleague who takes it over, when already known.
    #[serde(default)]
    pub target_employee_id: Option<String>,
}

/// Optional body of `POST /swaps/{id}/approve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveSwapRequest {
    /// Target supplied at approval time; overrides the one named at creation.
    #[serde(default)]
    pub target_employee_id: Option<String>,
}

/// Query string of `GET /overtime` and body of `POST /overtime/recalculate`.
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimeQuery {
    /// Monday of the week to compute.
    pub week_start: NaiveDate,
    /// Source of the weekly totals.
    pub strategy: OvertimeStrategy,
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Restrict to one department.
    #[serde(default)]
    pub department: Option<String>,
}
