//! Engine logic for the roster system.
//!
//! This module contains the scheduling conflict engine, the availability
//! matcher, the leave balance ledger, the leave and swap workflows, and the
//! weekly overtime calculator. Each submodule exposes plain functions taking
//! the shared [`crate::store::Store`] and the engine configuration; every
//! mutating operation runs as one store transaction so its validation and its
//! writes form a single atomic unit.

mod availability;
mod ledger;
mod leave;
mod overtime;
mod shifts;
mod swaps;

pub use availability::{check_availability, day_segments, DaySegment};
pub use ledger::{adjust_balance, BalanceAdjustment};
pub use leave::{
    approve_leave, create_leave_request, remove_leave_request, update_leave_status, LeaveApproval,
    NewLeaveRequest,
};
pub use overtime::{calculate_weekly_overtime, recalculate_weekly_overtime};
pub use shifts::{
    acknowledge_shift, bulk_create, cancel_shift, copy_week, create_shift, update_shift,
    BulkFailure, BulkOutcome, CopyWeekError, CopyWeekOutcome, NewShift, ShiftPatch,
    ShiftWithWarnings,
};
pub use swaps::{approve_swap, create_swap, reject_swap, SwapApproval};
