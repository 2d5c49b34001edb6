//! Shift swap requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a swap request. PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    /// Awaiting resolution.
    Pending,
    /// The shift has been reassigned to the target employee.
    Approved,
    /// Declined by the target or a manager.
    Rejected,
}

/// A request to hand a shift over to another employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Unique identifier for the swap.
    pub id: Uuid,
    /// The shift being handed over.
    pub shift_id: Uuid,
    /// The shift's current owner.
    pub requester_id: String,
    /// The employee the shift should go to; may be left open until approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_employee_id: Option<String>,
    /// Lifecycle status.
    pub status: SwapStatus,
    /// When the swap was requested.
    pub created_at: DateTime<Utc>,
    /// When the swap was approved or rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}
