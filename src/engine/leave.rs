//! Leave request workflow.
//!
//! Validates and creates leave requests, and runs the one multi-entity atomic
//! operation of the engine: approval, which debits the balance ledger,
//! transitions the request, and cancels every conflicting shift in a single
//! store transaction. A failure at any step leaves the request, the ledger,
//! and the shifts exactly as they were.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, LeaveRequest, LeaveStatus, LeaveUnit, Role, ShiftStatus};
use crate::store::{Database, Store};
use crate::time::{local_date, local_date_time_to_instant, local_midnight, MINUTES_PER_DAY};

/// Input for creating a leave request.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    /// The employee taking leave; defaults to the actor when absent.
    pub employee_id: Option<String>,
    /// The leave type code.
    pub leave_code: String,
    /// Granularity of the request.
    pub unit: LeaveUnit,
    /// First local date of the leave.
    pub start_date: NaiveDate,
    /// Last local date of the leave (inclusive for DAY unit).
    pub end_date: NaiveDate,
    /// Local start time; required for HOUR, defaulted for HALF_DAY.
    pub start_time: Option<NaiveTime>,
    /// Local end time; required for HOUR, defaulted for HALF_DAY.
    pub end_time: Option<NaiveTime>,
    /// The employee's stated reason.
    pub reason: Option<String>,
}

/// Result of a leave approval: the approved request and the shifts its
/// cascade cancelled.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveApproval {
    /// The request after the transition.
    #[serde(flatten)]
    pub request: LeaveRequest,
    /// Ids of the active shifts the approval cancelled.
    pub cancelled_shift_ids: Vec<Uuid>,
}

/// Resolves unit-specific local dates/times into the instant interval.
///
/// DAY spans local midnight of the start date to local midnight of the day
/// after the end date. HOUR and HALF_DAY must sit inside a single date;
/// HALF_DAY defaults to the configured window when times are absent.
fn resolve_interval(
    config: &EngineConfig,
    input: &NewLeaveRequest,
) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    if input.start_date > input.end_date {
        return Err(EngineError::InvalidDateRange {
            message: format!(
                "start date {} is after end date {}",
                input.start_date, input.end_date
            ),
        });
    }

    let (start_at, end_at) = match input.unit {
        LeaveUnit::Day => (
            local_midnight(input.start_date, config.offset_minutes),
            local_midnight(
                input.end_date.succ_opt().ok_or_else(|| EngineError::InvalidDateRange {
                    message: "end date out of range".to_string(),
                })?,
                config.offset_minutes,
            ),
        ),
        LeaveUnit::HalfDay | LeaveUnit::Hour => {
            if input.start_date != input.end_date {
                return Err(EngineError::InvalidDateRange {
                    message: "hour and half-day leave must fall on a single date".to_string(),
                });
            }
            let (start_time, end_time) = match input.unit {
                LeaveUnit::HalfDay => (
                    input.start_time.unwrap_or(config.half_day_start),
                    input.end_time.unwrap_or(config.half_day_end),
                ),
                _ => (
                    input.start_time.ok_or_else(|| EngineError::Validation {
                        message: "start_time is required for HOUR leave".to_string(),
                    })?,
                    input.end_time.ok_or_else(|| EngineError::Validation {
                        message: "end_time is required for HOUR leave".to_string(),
                    })?,
                ),
            };
            (
                local_date_time_to_instant(input.start_date, start_time, config.offset_minutes),
                local_date_time_to_instant(input.end_date, end_time, config.offset_minutes),
            )
        }
    };

    if start_at >= end_at {
        return Err(EngineError::InvalidTimeRange {
            start: start_at,
            end: end_at,
        });
    }
    Ok((start_at, end_at))
}

/// Minutes a request charges against the balance ledger.
///
/// DAY-unit leave charges one working day (`workday_minutes`, 480 by default)
/// per calendar day covered, not the 24h of wall clock its midnight-to-midnight
/// interval spans. HOUR and HALF_DAY charge the interval's wall-clock length.
fn charged_minutes(
    config: &EngineConfig,
    unit: LeaveUnit,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> i64 {
    let wall_clock = (end_at - start_at).num_minutes();
    match unit {
        LeaveUnit::Day => (wall_clock / i64::from(MINUTES_PER_DAY)) * config.workday_minutes,
        LeaveUnit::HalfDay | LeaveUnit::Hour => wall_clock,
    }
}

/// Validates and persists a new leave request as PENDING.
///
/// Paid leave types are checked against the ledger's remaining balance up
/// front; requests overlapping any pending or approved request of the same
/// employee are rejected.
pub fn create_leave_request(
    store: &Store,
    config: &EngineConfig,
    actor: &Actor,
    input: NewLeaveRequest,
) -> EngineResult<LeaveRequest> {
    store.transaction(|db| {
        let employee_id = input
            .employee_id
            .clone()
            .unwrap_or_else(|| actor.employee_id.clone());
        if employee_id != actor.employee_id {
            require_authority_over(db, actor, &employee_id)?;
        }
        let employee = db.employee(&employee_id)?.clone();
        let leave_type = db.leave_type(&input.leave_code)?.clone();

        let (start_at, end_at) = resolve_interval(config, &input)?;
        let leave_minutes = charged_minutes(config, input.unit, start_at, end_at);
        let year = input.start_date.year();

        if leave_type.is_paid {
            let remaining = db
                .leave_balance(&employee.id, &leave_type.code, year)?
                .remaining_minutes();
            if remaining < leave_minutes {
                return Err(EngineError::LeaveBalanceInsufficient {
                    remaining_minutes: remaining,
                    required_minutes: leave_minutes,
                });
            }
        }

        let overlap = db
            .leave_requests
            .values()
            .filter(|r| r.employee_id == employee.id)
            .filter(|r| r.blocks_overlap())
            .any(|r| r.overlaps(start_at, end_at));
        if overlap {
            return Err(EngineError::LeaveOverlap {
                employee_id: employee.id.clone(),
            });
        }

        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            leave_code: leave_type.code,
            unit: input.unit,
            start_at,
            end_at,
            status: LeaveStatus::Pending,
            reason: input.reason.clone(),
            manager_note: None,
            approved_at: None,
            rejected_at: None,
            cancelled_at: None,
        };
        db.leave_requests.insert(request.id, request.clone());
        Ok(request)
    })
}

/// Transitions a leave request to the target status.
///
/// An employee may only transition their own PENDING request to CANCELLED.
/// Managers and admins approve via the full approval transaction, reject a
/// PENDING request with an optional note, or apply any other target status as
/// a plain field update without side effects.
pub fn update_leave_status(
    store: &Store,
    config: &EngineConfig,
    actor: &Actor,
    request_id: Uuid,
    target: LeaveStatus,
    manager_note: Option<String>,
) -> EngineResult<LeaveApproval> {
    if target == LeaveStatus::Approved {
        return approve_leave(store, config, actor, request_id, manager_note);
    }

    store.transaction(|db| {
        let request = db.leave_request(request_id)?.clone();

        if !actor.is_privileged() {
            if request.employee_id != actor.employee_id {
                return Err(EngineError::Forbidden {
                    message: "cannot modify another employee's leave request".to_string(),
                });
            }
            if target != LeaveStatus::Cancelled {
                return Err(EngineError::Forbidden {
                    message: "employees may only cancel their own requests".to_string(),
                });
            }
            if request.status != LeaveStatus::Pending {
                return Err(EngineError::InvalidStatus {
                    expected: "PENDING".to_string(),
                    actual: status_label(request.status),
                });
            }
        }

        let mut updated = request;
        match target {
            LeaveStatus::Rejected => {
                if updated.status != LeaveStatus::Pending {
                    return Err(EngineError::InvalidStatus {
                        expected: "PENDING".to_string(),
                        actual: status_label(updated.status),
                    });
                }
                updated.status = LeaveStatus::Rejected;
                updated.manager_note = manager_note;
                updated.rejected_at = Some(Utc::now());
            }
            LeaveStatus::Cancelled => {
                updated.status = LeaveStatus::Cancelled;
                updated.cancelled_at = Some(Utc::now());
            }
            LeaveStatus::Pending => {
                updated.manager_note = manager_note;
            }
            LeaveStatus::Approved => unreachable!("handled above"),
        }

        db.leave_requests.insert(request_id, updated.clone());
        Ok(LeaveApproval {
            request: updated,
            cancelled_shift_ids: Vec::new(),
        })
    })
}

/// Approves a PENDING leave request as one atomic unit.
///
/// Re-verifies balance sufficiency inside the transaction (race protection),
/// debits `used_minutes` for paid types, transitions the request, cancels
/// every active shift of the employee overlapping `[start_at, end_at)` with a
/// history event each, and emits one audit entry summarizing the approval.
pub fn approve_leave(
    store: &Store,
    config: &EngineConfig,
    actor: &Actor,
    request_id: Uuid,
    manager_note: Option<String>,
) -> EngineResult<LeaveApproval> {
    store.transaction(|db| {
        let request = db.leave_request(request_id)?.clone();
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::InvalidStatus {
                expected: "PENDING".to_string(),
                actual: status_label(request.status),
            });
        }

        match actor.role {
            Role::Admin => {}
            Role::Manager => require_authority_over(db, actor, &request.employee_id)?,
            Role::Employee => {
                return Err(EngineError::Forbidden {
                    message: "only managers may approve leave requests".to_string(),
                });
            }
        }

        let leave_type = db.leave_type(&request.leave_code)?.clone();
        let leave_minutes = charged_minutes(config, request.unit, request.start_at, request.end_at);
        let year = local_date(request.start_at, config.offset_minutes).year();

        if leave_type.is_paid {
            let balance = db
                .leave_balance(&request.employee_id, &leave_type.code, year)?
                .clone();
            let remaining = balance.remaining_minutes();
            if remaining < leave_minutes {
                return Err(EngineError::LeaveBalanceInsufficient {
                    remaining_minutes: remaining,
                    required_minutes: leave_minutes,
                });
            }
            let key = (request.employee_id.clone(), leave_type.code.clone(), year);
            let mut debited = balance;
            debited.used_minutes += leave_minutes;
            db.leave_balances.insert(key, debited);
        }

        let mut approved = request.clone();
        approved.status = LeaveStatus::Approved;
        approved.manager_note = manager_note;
        approved.approved_at = Some(Utc::now());
        db.leave_requests.insert(request_id, approved.clone());

        let conflicting: Vec<Uuid> = db
            .shifts_for(&request.employee_id)
            .filter(|s| s.is_active())
            .filter(|s| s.overlaps(request.start_at, request.end_at))
            .map(|s| s.id)
            .collect();
        for shift_id in &conflicting {
            if let Some(shift) = db.shifts.get_mut(shift_id) {
                shift.status = ShiftStatus::Cancelled;
                shift.cancelled_by_leave = Some(request_id);
            }
            db.record_audit(
                &actor.employee_id,
                "shift.cancel",
                format!("shift {shift_id} cancelled by approval of leave request {request_id}"),
            );
        }
        db.record_audit(
            &actor.employee_id,
            "leave.approve",
            format!(
                "leave request {request_id} approved for employee {}; {} shift(s) cancelled",
                request.employee_id,
                conflicting.len()
            ),
        );

        Ok(LeaveApproval {
            request: approved,
            cancelled_shift_ids: conflicting,
        })
    })
}

/// Deletes a leave request.
///
/// Admins may delete any request; other actors only their own request and
/// only while it is still PENDING.
pub fn remove_leave_request(store: &Store, actor: &Actor, request_id: Uuid) -> EngineResult<()> {
    store.transaction(|db| {
        let request = db.leave_request(request_id)?.clone();
        if actor.role != Role::Admin {
            if request.employee_id != actor.employee_id {
                return Err(EngineError::Forbidden {
                    message: "cannot delete another employee's leave request".to_string(),
                });
            }
            if request.status != LeaveStatus::Pending {
                return Err(EngineError::Forbidden {
                    message: "only pending requests can be deleted".to_string(),
                });
            }
        }
        db.leave_requests.remove(&request_id);
        Ok(())
    })
}

/// A manager has authority over employees of their own department; an admin
/// over everyone.
fn require_authority_over(db: &Database, actor: &Actor, employee_id: &str) -> EngineResult<()> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Manager => {
            let employee = db.employee(employee_id)?;
            if employee.department == actor.department {
                Ok(())
            } else {
                Err(EngineError::Forbidden {
                    message: "employee is outside the manager's department".to_string(),
                })
            }
        }
        Role::Employee => Err(EngineError::Forbidden {
            message: "insufficient role".to_string(),
        }),
    }
}

fn status_label(status: LeaveStatus) -> String {
    match status {
        LeaveStatus::Pending => "PENDING",
        LeaveStatus::Approved => "APPROVED",
        LeaveStatus::Rejected => "REJECTED",
        LeaveStatus::Cancelled => "CANCELLED",
    }
    .to_string()
}
