//! HTTP request handlers for the roster engine API.
//!
//! This module contains the handler functions for all API endpoints. The
//! acting employee is resolved from the `X-Actor-Id` header; identity
//! issuance itself lives outside the engine.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{
    acknowledge_shift, adjust_balance, approve_swap, bulk_create, calculate_weekly_overtime,
    cancel_shift, copy_week, create_leave_request, create_shift, create_swap,
    recalculate_weekly_overtime, reject_swap, remove_leave_request, update_leave_status,
    update_shift, BalanceAdjustment,
};
use crate::error::EngineError;
use crate::models::{Actor, LeaveRequest, Shift};

use super::request::{
    AdjustBalanceRequest, ApproveSwapRequest, BalancesQuery, BulkCreateRequest, CopyWeekRequest,
    CreateLeaveRequest, CreateShiftRequest, CreateSwapRequest, LeaveRequestsQuery, OvertimeQuery,
    ShiftsQuery, UpdateLeaveStatusRequest, UpdateShiftRequest,
};
use super::response::{ApiError, ApiErrorResponse, OvertimeReport};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/shifts", post(create_shift_handler).get(list_shifts_handler))
        .route("/shifts/bulk", post(bulk_create_handler))
        .route("/shifts/copy-week", post(copy_week_handler))
        .route("/shifts/:id", get(get_shift_handler).patch(update_shift_handler))
        .route("/shifts/:id/cancel", post(cancel_shift_handler))
        .route("/shifts/:id/acknowledge", post(acknowledge_shift_handler))
        .route(
            "/leave-requests",
            post(create_leave_handler).get(list_leave_requests_handler),
        )
        .route("/leave-requests/:id/status", patch(update_leave_status_handler))
        .route("/leave-requests/:id", delete(delete_leave_request_handler))
        .route("/leave-balances", get(list_balances_handler))
        .route("/leave-balances/adjust", post(adjust_balance_handler))
        .route("/overtime", get(overtime_report_handler))
        .route("/overtime/recalculate", post(recalculate_overtime_handler))
        .route("/swaps", post(create_swap_handler))
        .route("/swaps/:id/approve", post(approve_swap_handler))
        .route("/swaps/:id/reject", post(reject_swap_handler))
        .with_state(state)
}

/// Resolves the acting employee from the `X-Actor-Id` header.
fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Result<Actor, ApiErrorResponse> {
    let actor_id = headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiErrorResponse::unauthorized("missing X-Actor-Id header"))?;
    state
        .store()
        .read(|db| db.employee(actor_id).map(Actor::from_employee))
        .map_err(|_| ApiErrorResponse::unauthorized(format!("unknown actor '{actor_id}'")))
}

/// Rejects actors without manager or admin rights.
fn require_privileged(actor: &Actor) -> Result<(), ApiErrorResponse> {
    if actor.is_privileged() {
        Ok(())
    } else {
        Err(EngineError::Forbidden {
            message: "manager or admin role required".to_string(),
        }
        .into())
    }
}

/// Maps a JSON extraction failure to a 400 response.
fn json_error(rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            ApiError::malformed_json(format!("Invalid JSON syntax: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
}

/// Handler for `POST /shifts`.
async fn create_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateShiftRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let Json(request) = payload.map_err(json_error)?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        "Creating shift"
    );
    let created = create_shift(state.store(), state.config(), request.into()).map_err(|err| {
        warn!(correlation_id = %correlation_id, error = %err, "Shift creation rejected");
        ApiErrorResponse::from(err)
    })?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for `GET /shifts`; results are filtered to the actor's scope.
async fn list_shifts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ShiftsQuery>,
) -> Result<Json<Vec<Shift>>, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let scope = actor.scope();
    let shifts = state.store().read(|db| {
        let mut rows: Vec<Shift> = db
            .shifts
            .values()
            .filter(|s| query.employee_id.as_deref().is_none_or(|id| s.employee_id == id))
            .filter(|s| query.from.is_none_or(|from| s.end_time > from))
            .filter(|s| query.to.is_none_or(|to| s.start_time < to))
            .filter(|s| {
                db.employees
                    .get(&s.employee_id)
                    .is_some_and(|e| scope.permits(e))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.start_time, s.employee_id.clone()));
        rows
    });
    Ok(Json(shifts))
}

/// Handler for `GET /shifts/{id}`.
///
/// A shift outside the actor's scope is reported as not found rather than
/// forbidden, so the lookup does not disclose its existence.
async fn get_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<Shift>, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let scope = actor.scope();
    let shift = state.store().read(|db| {
        let shift = db.shift(shift_id)?;
        let visible = db
            .employees
            .get(&shift.employee_id)
            .is_some_and(|e| scope.permits(e));
        if visible {
            Ok(shift.clone())
        } else {
            Err(EngineError::NotFound {
                entity: "shift".to_string(),
                id: shift_id.to_string(),
            })
        }
    })?;
    Ok(Json(shift))
}

/// Handler for `PATCH /shifts/{id}`.
async fn update_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<Uuid>,
    payload: Result<Json<UpdateShiftRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let Json(request) = payload.map_err(json_error)?;

    let updated =
        update_shift(state.store(), state.config(), shift_id, request.into()).map_err(|err| {
            warn!(
                correlation_id = %correlation_id,
                shift_id = %shift_id,
                error = %err,
                "Shift update rejected"
            );
            ApiErrorResponse::from(err)
        })?;
    Ok(Json(updated))
}

/// Handler for `POST /shifts/{id}/cancel`.
async fn cancel_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let cancelled = cancel_shift(state.store(), shift_id)?;
    Ok(Json(cancelled))
}

/// Handler for `POST /shifts/{id}/acknowledge`.
///
/// A shift is acknowledged by the employee who works it; managers and admins
/// may acknowledge on their behalf.
async fn acknowledge_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    if !actor.is_privileged() {
        let owner = state
            .store()
            .read(|db| db.shift(shift_id).map(|s| s.employee_id.clone()))?;
        if owner != actor.employee_id {
            return Err(EngineError::Forbidden {
                message: "cannot acknowledge another employee's shift".to_string(),
            }
            .into());
        }
    }
    let acknowledged = acknowledge_shift(state.store(), shift_id)?;
    Ok(Json(acknowledged))
}

/// Handler for `POST /shifts/bulk`.
async fn bulk_create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let Json(request) = payload.map_err(json_error)?;

    let items = request.shifts.into_iter().map(Into::into).collect();
    let outcome = bulk_create(state.store(), state.config(), items);
    info!(
        correlation_id = %correlation_id,
        created = outcome.created.len(),
        failed = outcome.failures.len(),
        "Bulk shift creation finished"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Handler for `POST /shifts/copy-week`.
async fn copy_week_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CopyWeekRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let Json(request) = payload.map_err(json_error)?;

    let outcome = copy_week(
        state.store(),
        state.config(),
        request.source_week_start,
        request.target_week_start,
    );
    info!(
        correlation_id = %correlation_id,
        source_week = %request.source_week_start,
        target_week = %request.target_week_start,
        created = outcome.created.len(),
        skipped = outcome.errors.len(),
        "Week copy finished"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Handler for `POST /leave-requests`.
async fn create_leave_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateLeaveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    let Json(request) = payload.map_err(json_error)?;

    let created = create_leave_request(state.store(), state.config(), &actor, request.into())
        .map_err(|err| {
            warn!(
                correlation_id = %correlation_id,
                actor_id = %actor.employee_id,
                error = %err,
                "Leave request rejected"
            );
            ApiErrorResponse::from(err)
        })?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for `GET /leave-requests`; results are filtered to the actor's scope.
async fn list_leave_requests_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LeaveRequestsQuery>,
) -> Result<Json<Vec<LeaveRequest>>, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let scope = actor.scope();
    let requests = state.store().read(|db| {
        let mut rows: Vec<LeaveRequest> = db
            .leave_requests
            .values()
            .filter(|r| query.employee_id.as_deref().is_none_or(|id| r.employee_id == id))
            .filter(|r| query.status.is_none_or(|status| r.status == status))
            .filter(|r| {
                db.employees
                    .get(&r.employee_id)
                    .is_some_and(|e| scope.permits(e))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.start_at, r.employee_id.clone()));
        rows
    });
    Ok(Json(requests))
}

/// Handler for `PATCH /leave-requests/{id}/status`.
async fn update_leave_status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<Uuid>,
    payload: Result<Json<UpdateLeaveStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    let Json(request) = payload.map_err(json_error)?;

    let result = update_leave_status(
        state.store(),
        state.config(),
        &actor,
        request_id,
        request.status,
        request.manager_note,
    )
    .map_err(|err| {
        warn!(
            correlation_id = %correlation_id,
            request_id = %request_id,
            error = %err,
            "Leave status transition rejected"
        );
        ApiErrorResponse::from(err)
    })?;
    info!(
        correlation_id = %correlation_id,
        request_id = %request_id,
        cancelled_shifts = result.cancelled_shift_ids.len(),
        "Leave status transition applied"
    );
    Ok(Json(result))
}

/// Handler for `DELETE /leave-requests/{id}`.
async fn delete_leave_request_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    remove_leave_request(state.store(), &actor, request_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `GET /leave-balances`; results are filtered to the actor's scope.
async fn list_balances_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BalancesQuery>,
) -> Result<Json<Vec<BalanceAdjustment>>, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let scope = actor.scope();
    let balances = state.store().read(|db| {
        let mut rows: Vec<BalanceAdjustment> = db
            .leave_balances
            .values()
            .filter(|b| query.employee_id.as_deref().is_none_or(|id| b.employee_id == id))
            .filter(|b| query.year.is_none_or(|year| b.year == year))
            .filter(|b| {
                db.employees
                    .get(&b.employee_id)
                    .is_some_and(|e| scope.permits(e))
            })
            .map(|b| BalanceAdjustment {
                balance: b.clone(),
                remaining_minutes: b.remaining_minutes(),
            })
            .collect();
        rows.sort_by_key(|r| {
            (
                r.balance.employee_id.clone(),
                r.balance.leave_code.clone(),
                r.balance.year,
            )
        });
        rows
    });
    Ok(Json(balances))
}

/// Handler for `POST /leave-balances/adjust`.
async fn adjust_balance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AdjustBalanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let Json(request) = payload.map_err(json_error)?;

    let result = adjust_balance(
        state.store(),
        &actor,
        &request.employee_id,
        &request.leave_code,
        request.year,
        request.delta_minutes,
        &request.reason,
    )
    .map_err(|err| {
        warn!(
            correlation_id = %correlation_id,
            employee_id = %request.employee_id,
            delta_minutes = request.delta_minutes,
            error = %err,
            "Balance adjustment rejected"
        );
        ApiErrorResponse::from(err)
    })?;
    Ok(Json(result))
}

/// Handler for `GET /overtime`.
///
/// Non-privileged actors only ever see their own row.
async fn overtime_report_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OvertimeQuery>,
) -> Result<Json<OvertimeReport>, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let employee_filter = if actor.is_privileged() {
        query.employee_id.clone()
    } else {
        Some(actor.employee_id.clone())
    };
    let rows = calculate_weekly_overtime(
        state.store(),
        state.config(),
        query.week_start,
        query.strategy,
        employee_filter.as_deref(),
        query.department.as_deref(),
    )?;
    Ok(Json(OvertimeReport {
        week_start: query.week_start,
        strategy: query.strategy,
        rows,
    }))
}

/// Handler for `POST /overtime/recalculate`.
async fn recalculate_overtime_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OvertimeQuery>, JsonRejection>,
) -> Result<Json<OvertimeReport>, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_privileged(&actor)?;
    let Json(request) = payload.map_err(json_error)?;

    let rows = recalculate_weekly_overtime(
        state.store(),
        state.config(),
        &actor,
        request.week_start,
        request.strategy,
        request.employee_id.as_deref(),
        request.department.as_deref(),
    )?;
    info!(
        correlation_id = %correlation_id,
        week_start = %request.week_start,
        rows = rows.len(),
        "Overtime snapshot recomputed"
    );
    Ok(Json(OvertimeReport {
        week_start: request.week_start,
        strategy: request.strategy,
        rows,
    }))
}

/// Handler for `POST /swaps`.
async fn create_swap_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateSwapRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let Json(request) = payload.map_err(json_error)?;

    let created = create_swap(
        state.store(),
        &actor,
        request.shift_id,
        request.target_employee_id,
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for `POST /swaps/{id}/approve`.
///
/// The body is optional; when present it may name the definitive target.
async fn approve_swap_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(swap_id): Path<Uuid>,
    payload: Option<Json<ApproveSwapRequest>>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    let approval_target = payload.and_then(|Json(body)| body.target_employee_id);
    let approval = approve_swap(state.store(), &actor, swap_id, approval_target).map_err(|err| {
        warn!(
            correlation_id = %correlation_id,
            swap_id = %swap_id,
            error = %err,
            "Swap approval rejected"
        );
        ApiErrorResponse::from(err)
    })?;
    info!(
        correlation_id = %correlation_id,
        swap_id = %swap_id,
        new_shift_id = %approval.new_shift.id,
        "Swap approved"
    );
    Ok(Json(approval))
}

/// Handler for `POST /swaps/{id}/reject`.
async fn reject_swap_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(swap_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErrorResponse> {
    let actor = resolve_actor(&state, &headers)?;
    let rejected = reject_swap(state.store(), &actor, swap_id)?;
    Ok(Json(rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{Employee, Role};
    use crate::store::{Database, Store};
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut db = Database::default();
        db.employees.insert(
            "m1".to_string(),
            Employee {
                id: "m1".to_string(),
                name: "Morgan".to_string(),
                department: "ops".to_string(),
                role: Role::Manager,
                max_weekly_minutes: 2400,
                hourly_rate: Decimal::new(3000, 2),
            },
        );
        let loader = ConfigLoader::load("./config").expect("Failed to load config");
        AppState::new(Store::with_database(db), loader.config().clone())
    }

    #[tokio::test]
    async fn test_missing_actor_header_returns_401() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/shifts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_actor_returns_401() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/shifts")
                    .header("X-Actor-Id", "ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/shifts")
                    .header("X-Actor-Id", "m1")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{invalid json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }
}
