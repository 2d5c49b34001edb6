//! Data model for the roster engine.
//!
//! Entity structs and their status enums. All types are serde-derived; the
//! engine persists them in the in-memory [`crate::store::Store`] and the API
//! layer serializes them directly.

mod availability;
mod employee;
mod leave;
mod overtime;
mod shift;
mod swap;

pub use availability::{AvailabilityBlock, AvailabilityType};
pub use employee::{AccessScope, Actor, Employee, Role};
pub use leave::{LeaveBalance, LeaveRequest, LeaveStatus, LeaveType, LeaveUnit};
pub use overtime::{OvertimeRecord, OvertimeStrategy, TimeEntry};
pub use shift::{Shift, ShiftStatus};
pub use swap::{SwapRequest, SwapStatus};
