//! Shift swap workflow.
//!
//! A swap request points at one shift and optionally names the colleague who
//! will take it over. Approval clones the shift onto the target employee and
//! marks the original SWAPPED, keeping the roster history intact; rejection
//! only resolves the request.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Shift, ShiftStatus, SwapRequest, SwapStatus};
use crate::store::Store;

/// Result of a swap approval.
#[derive(Debug, Clone, Serialize)]
pub struct SwapApproval {
    /// The request after the transition.
    #[serde(flatten)]
    pub request: SwapRequest,
    /// The shift created for the target employee.
    pub new_shift: Shift,
}

/// Creates a PENDING swap request for a shift.
///
/// The requester must own the shift unless they are a manager or admin. A
/// shift can carry at most one pending request at a time.
pub fn create_swap(
    store: &Store,
    actor: &Actor,
    shift_id: Uuid,
    target_employee_id: Option<String>,
) -> EngineResult<SwapRequest> {
    store.transaction(|db| {
        let shift = db.shift(shift_id)?.clone();
        if shift.employee_id != actor.employee_id && !actor.is_privileged() {
            return Err(EngineError::Forbidden {
                message: "cannot request a swap for another employee's shift".to_string(),
            });
        }
        if !matches!(
            shift.status,
            ShiftStatus::Published | ShiftStatus::Acknowledged
        ) {
            return Err(EngineError::InvalidStatus {
                expected: "PUBLISHED or ACKNOWLEDGED".to_string(),
                actual: format!("{:?}", shift.status).to_uppercase(),
            });
        }
        if let Some(target) = &target_employee_id {
            if *target == shift.employee_id {
                return Err(EngineError::Validation {
                    message: "swap target must be a different employee".to_string(),
                });
            }
            let target_department = db.employee(target)?.department.clone();
            let requester_department = db.employee(&shift.employee_id)?.department.clone();
            if target_department != requester_department {
                return Err(EngineError::Forbidden {
                    message: "swap target is outside the requester's department".to_string(),
                });
            }
        }
        let already_pending = db
            .swap_requests
            .values()
            .any(|r| r.shift_id == shift_id && r.status == SwapStatus::Pending);
        if already_pending {
            return Err(EngineError::Validation {
                message: "shift already has a pending swap request".to_string(),
            });
        }

        let request = SwapRequest {
            id: Uuid::new_v4(),
            shift_id,
            requester_id: shift.employee_id.clone(),
            target_employee_id,
            status: SwapStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };
        db.swap_requests.insert(request.id, request.clone());
        Ok(request)
    })
}

/// Approves a PENDING swap request as one atomic unit.
///
/// Clones the shift onto the target employee as a fresh PUBLISHED shift,
/// marks the original SWAPPED, and resolves the request. A target supplied at
/// approval time becomes the definitive one, overriding any the request named
/// at creation; a request left open must be given one here.
pub fn approve_swap(
    store: &Store,
    actor: &Actor,
    swap_id: Uuid,
    approval_target: Option<String>,
) -> EngineResult<SwapApproval> {
    store.transaction(move |db| {
        let request = db.swap_request(swap_id)?.clone();
        if !actor.is_privileged() {
            return Err(EngineError::Forbidden {
                message: "only managers may resolve swap requests".to_string(),
            });
        }
        if request.status != SwapStatus::Pending {
            return Err(EngineError::InvalidStatus {
                expected: "PENDING".to_string(),
                actual: format!("{:?}", request.status).to_uppercase(),
            });
        }
        let target_id = approval_target
            .or_else(|| request.target_employee_id.clone())
            .ok_or_else(|| EngineError::Validation {
                message: "swap request has no target employee".to_string(),
            })?;
        if target_id == request.requester_id {
            return Err(EngineError::Validation {
                message: "swap target must be a different employee".to_string(),
            });
        }
        db.employee(&target_id)?;

        let original = db.shift(request.shift_id)?.clone();
        if !matches!(
            original.status,
            ShiftStatus::Published | ShiftStatus::Acknowledged
        ) {
            return Err(EngineError::InvalidStatus {
                expected: "PUBLISHED or ACKNOWLEDGED".to_string(),
                actual: format!("{:?}", original.status).to_uppercase(),
            });
        }

        let new_shift = Shift {
            id: Uuid::new_v4(),
            employee_id: target_id,
            start_time: original.start_time,
            end_time: original.end_time,
            status: ShiftStatus::Published,
            note: original.note.clone(),
            cancelled_by_leave: None,
        };
        db.shifts.insert(new_shift.id, new_shift.clone());
        if let Some(shift) = db.shifts.get_mut(&original.id) {
            shift.status = ShiftStatus::Swapped;
        }

        let mut approved = request;
        approved.target_employee_id = Some(new_shift.employee_id.clone());
        approved.status = SwapStatus::Approved;
        approved.resolved_at = Some(Utc::now());
        db.swap_requests.insert(swap_id, approved.clone());
        db.record_audit(
            &actor.employee_id,
            "swap.approve",
            format!(
                "swap {swap_id} approved; shift {} reassigned from {} to {} as shift {}",
                original.id, approved.requester_id, new_shift.employee_id, new_shift.id
            ),
        );

        Ok(SwapApproval {
            request: approved,
            new_shift,
        })
    })
}

/// Rejects a PENDING swap request; the shift is left untouched.
///
/// A named target may reject on their own behalf, the requester may withdraw
/// their own request, and managers and admins may reject any request.
pub fn reject_swap(store: &Store, actor: &Actor, swap_id: Uuid) -> EngineResult<SwapRequest> {
    store.transaction(|db| {
        let request = db.swap_request(swap_id)?.clone();
        let may_reject = actor.is_privileged()
            || actor.employee_id == request.requester_id
            || request.target_employee_id.as_deref() == Some(actor.employee_id.as_str());
        if !may_reject {
            return Err(EngineError::Forbidden {
                message: "only the target, the requester, or a manager may reject a swap"
                    .to_string(),
            });
        }
        if request.status != SwapStatus::Pending {
            return Err(EngineError::InvalidStatus {
                expected: "PENDING".to_string(),
                actual: format!("{:?}", request.status).to_uppercase(),
            });
        }
        let mut rejected = request;
        rejected.status = SwapStatus::Rejected;
        rejected.resolved_at = Some(Utc::now());
        db.swap_requests.insert(swap_id, rejected.clone());
        Ok(rejected)
    })
}
