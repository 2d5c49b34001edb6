//! HTTP API module for the roster engine.
//!
//! This module provides the REST endpoints for shifts, leave requests,
//! balances, swaps, and the weekly overtime report.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AdjustBalanceRequest, ApproveSwapRequest, BulkCreateRequest, CopyWeekRequest,
    CreateLeaveRequest, CreateShiftRequest, CreateSwapRequest, OvertimeQuery,
    UpdateLeaveStatusRequest, UpdateShiftRequest,
};
pub use response::{ApiError, OvertimeReport};
pub use state::AppState;
