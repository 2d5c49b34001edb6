//! Error types for the roster engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while validating and mutating
//! shifts, availability rules, leave requests, balances, and swaps.

use chrono::{DateTime, Utc, Weekday};
use thiserror::Error;

/// The main error type for the roster engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application. Every variant
/// maps to a stable API code via [`EngineError::code`].
///
/// # Example
///
/// ```
/// use roster_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "shift".to_string(),
///     id: "b5c7…".to_string(),
/// };
/// assert_eq!(error.code(), "NOT_FOUND");
/// ```
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A time range had its start at or after its end.
    #[error("Invalid time range: start {start} must be before end {end}")]
    InvalidTimeRange {
        /// The offending start instant.
        start: DateTime<Utc>,
        /// The offending end instant.
        end: DateTime<Utc>,
    },

    /// A leave request's dates were inconsistent (start after end, or a
    /// multi-date span for an hour/half-day unit).
    #[error("Invalid date range: {message}")]
    InvalidDateRange {
        /// A description of the inconsistency.
        message: String,
    },

    /// The proposed shift overlaps an existing non-cancelled shift.
    #[error("Shift overlaps an existing shift for employee '{employee_id}'")]
    ShiftOverlap {
        /// The employee whose calendar already holds the conflicting shift.
        employee_id: String,
    },

    /// The shift intersects an UNAVAILABLE block and no override was given.
    #[error("Employee is unavailable on {day}")]
    UnavailableConflict {
        /// The weekday whose availability rule blocked the shift.
        day: Weekday,
    },

    /// The shift falls outside an AVAILABLE_ONLY window and no override was given.
    #[error("Shift falls outside the employee's available-only window on {day}")]
    AvailableOnlyConflict {
        /// The weekday whose availability rule blocked the shift.
        day: Weekday,
    },

    /// The leave request overlaps another pending or approved request.
    #[error("Leave request overlaps an existing pending or approved request for employee '{employee_id}'")]
    LeaveOverlap {
        /// The employee with the conflicting request.
        employee_id: String,
    },

    /// The leave balance cannot cover the requested minutes.
    #[error("Insufficient leave balance: {remaining_minutes} minutes remaining, {required_minutes} required")]
    LeaveBalanceInsufficient {
        /// Minutes remaining on the ledger before the request.
        remaining_minutes: i64,
        /// Minutes the request needs.
        required_minutes: i64,
    },

    /// A balance adjustment would drive the remaining balance below zero.
    #[error("Adjustment rejected: balance would become {remaining_after} minutes")]
    NegativeBalance {
        /// The remaining balance the adjustment would have produced.
        remaining_after: i64,
    },

    /// The referenced record does not exist (or is hidden from the actor).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record ("shift", "leave request", ...).
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A status transition was requested from an illegal source status.
    #[error("Invalid status: expected {expected}, found {actual}")]
    InvalidStatus {
        /// The status the operation requires.
        expected: String,
        /// The status the record actually has.
        actual: String,
    },

    /// The actor is not allowed to perform the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// A description of the denied action.
        message: String,
    },

    /// Malformed or missing input outside the more specific variants.
    #[error("Validation error: {message}")]
    Validation {
        /// A description of the invalid input.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An unexpected internal failure. Logged; surfaced opaquely.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the failure (not exposed to API clients).
        message: String,
    },
}

impl EngineError {
    /// Returns the stable API code for this error.
    ///
    /// Bulk operations embed these codes in their per-item failure lists, and
    /// the HTTP layer uses them as the `code` field of error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidTimeRange { .. } => "INVALID_TIME_RANGE",
            EngineError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            EngineError::ShiftOverlap { .. } => "SHIFT_OVERLAP",
            EngineError::UnavailableConflict { .. } => "UNAVAILABLE_CONFLICT",
            EngineError::AvailableOnlyConflict { .. } => "AVAILABLE_ONLY_CONFLICT",
            EngineError::LeaveOverlap { .. } => "LEAVE_OVERLAP",
            EngineError::LeaveBalanceInsufficient { .. } => "LEAVE_BALANCE_INSUFFICIENT",
            EngineError::NegativeBalance { .. } => "NEGATIVE_BALANCE",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::InvalidStatus { .. } => "INVALID_STATUS",
            EngineError::Forbidden { .. } => "FORBIDDEN",
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
