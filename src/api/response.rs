//! Response types for the roster engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{OvertimeRecord, OvertimeStrategy};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// An authentication failure (missing or unknown actor header).
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHORIZED", message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match &error {
            EngineError::InvalidTimeRange { .. }
            | EngineError::InvalidDateRange { .. }
            | EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::ShiftOverlap { .. }
            | EngineError::UnavailableConflict { .. }
            | EngineError::AvailableOnlyConflict { .. }
            | EngineError::LeaveOverlap { .. }
            | EngineError::InvalidStatus { .. } => StatusCode::CONFLICT,
            EngineError::LeaveBalanceInsufficient { .. }
            | EngineError::NegativeBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Forbidden { .. } => StatusCode::FORBIDDEN,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &error {
            EngineError::LeaveBalanceInsufficient {
                remaining_minutes,
                required_minutes,
            } => Some(format!(
                "shortfall of {} minutes",
                required_minutes - remaining_minutes
            )),
            EngineError::NegativeBalance { remaining_after } => Some(format!(
                "the adjustment would leave {remaining_after} minutes on the ledger"
            )),
            // Internal failure text stays in the logs.
            EngineError::Internal { .. } => {
                return ApiErrorResponse {
                    status,
                    error: ApiError::new("INTERNAL_ERROR", "Internal error"),
                };
            }
            _ => None,
        };

        ApiErrorResponse {
            status,
            error: ApiError {
                code: error.code().to_string(),
                message: error.to_string(),
                details,
            },
        }
    }
}

/// Body of the weekly overtime report endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct OvertimeReport {
    /// The Monday the report covers.
    pub week_start: NaiveDate,
    /// The strategy the totals were computed from.
    pub strategy: OvertimeStrategy,
    /// One row per employee in scope.
    pub rows: Vec<OvertimeRecord>,
}
