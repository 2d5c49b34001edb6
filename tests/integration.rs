//! End-to-end tests driving the HTTP API against a seeded in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use roster_engine::api::{create_router, AppState};
use roster_engine::config::EngineConfig;
use roster_engine::models::{
    AvailabilityBlock, AvailabilityType, Employee, LeaveBalance, LeaveType, Role,
};
use roster_engine::store::{Database, Store};

fn employee(id: &str, department: &str, role: Role) -> Employee {
    Employee {
        id: id.to_string(),
        name: id.to_string(),
        department: department.to_string(),
        role,
        max_weekly_minutes: 2400,
        hourly_rate: Decimal::new(3000, 2),
    }
}

/// Router over a store seeded with:
/// - manager `mgr` and employees `sam`, `ava`, `lee`, `ot` in ops, `tara` in sales
/// - `ava` UNAVAILABLE on Tuesdays 08:00-17:00 through 2026
/// - paid ANNUAL leave with a 6720-minute balance for `lee`
fn setup() -> Router {
    let mut db = Database::default();
    for e in [
        employee("mgr", "ops", Role::Manager),
        employee("sam", "ops", Role::Employee),
        employee("ava", "ops", Role::Employee),
        employee("lee", "ops", Role::Employee),
        employee("ot", "ops", Role::Employee),
        employee("tara", "sales", Role::Employee),
    ] {
        db.employees.insert(e.id.clone(), e);
    }
    db.availability_blocks.push(AvailabilityBlock {
        id: Uuid::new_v4(),
        employee_id: "ava".to_string(),
        block_type: AvailabilityType::Unavailable,
        day: Weekday::Tue,
        start_time: NaiveTime::from_hms_opt(8, 0, 0),
        end_time: NaiveTime::from_hms_opt(17, 0, 0),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1),
        effective_to: NaiveDate::from_ymd_opt(2026, 12, 31),
        note: None,
    });
    db.leave_types.insert(
        "ANNUAL".to_string(),
        LeaveType {
            code: "ANNUAL".to_string(),
            name: "Annual leave".to_string(),
            is_paid: true,
            requires_document: false,
            annual_entitlement_days: Some(14),
        },
    );
    db.leave_balances.insert(
        ("lee".to_string(), "ANNUAL".to_string(), 2026),
        LeaveBalance {
            employee_id: "lee".to_string(),
            leave_code: "ANNUAL".to_string(),
            year: 2026,
            accrued_minutes: 6720,
            carry_minutes: 0,
            adjusted_minutes: 0,
            used_minutes: 0,
        },
    );

    let config = EngineConfig::new(
        600, // UTC+10
        Decimal::new(15, 1),
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
    );
    create_router(AppState::new(Store::with_database(db), config))
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    actor: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Actor-Id", actor);
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Shift body for `employee_id` on a local date (UTC+10), hours given in
/// local wall-clock.
fn shift_body(employee_id: &str, date: &str, start: &str, end: &str) -> Value {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let to_utc = |time: &str| {
        let time = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
        let local = date.and_time(time);
        (local - chrono::Duration::minutes(600))
            .and_utc()
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    };
    json!({
        "employee_id": employee_id,
        "start_time": to_utc(start),
        "end_time": to_utc(end),
    })
}

#[tokio::test]
async fn test_created_shift_is_published_with_no_warnings() {
    let router = setup();
    let (status, body) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PUBLISHED");
    assert_eq!(body["warnings"], json!([]));
}

#[tokio::test]
async fn test_fetch_after_create_returns_published_shift() {
    let router = setup();
    let (_, created) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&router, "GET", &format!("/shifts/{id}"), "sam", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PUBLISHED");

    // An out-of-scope actor learns nothing about the shift's existence.
    let (status, body) = send(&router, "GET", &format!("/shifts/{id}"), "tara", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_overlapping_shift_is_rejected_with_conflict() {
    let router = setup();
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let (status, body) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "10:00", "18:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SHIFT_OVERLAP");
}

#[tokio::test]
async fn test_touching_shifts_are_accepted() {
    let router = setup();
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let (status, _) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "16:00", "22:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_unavailable_block_rejects_then_override_warns() {
    let router = setup();
    // 2026-01-06 is a Tuesday inside ava's UNAVAILABLE window.
    let (status, body) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("ava", "2026-01-06", "09:00", "12:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "UNAVAILABLE_CONFLICT");

    let mut request = shift_body("ava", "2026-01-06", "09:00", "12:00");
    request["force_override"] = json!(true);
    let (status, body) = send(&router, "POST", "/shifts", "mgr", Some(request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_employee_cannot_create_shifts() {
    let router = setup();
    let (status, body) = send(
        &router,
        "POST",
        "/shifts",
        "sam",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_shift_list_is_scoped_to_the_actor() {
    let router = setup();
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("ot", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("tara", "2026-03-02", "08:00", "16:00")),
    )
    .await;

    // Individual contributor: self only.
    let (_, body) = send(&router, "GET", "/shifts", "sam", None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee_id"], "sam");

    // Line manager: own department only.
    let (_, body) = send(&router, "GET", "/shifts", "mgr", None).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["employee_id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"sam") && ids.contains(&"ot"));
    assert!(!ids.contains(&"tara"));
}

#[tokio::test]
async fn test_acknowledge_flow_and_double_acknowledge() {
    let router = setup();
    let (_, created) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        "POST",
        &format!("/shifts/{id}/acknowledge"),
        "sam",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACKNOWLEDGED");

    let (status, body) = send(
        &router,
        "POST",
        &format!("/shifts/{id}/acknowledge"),
        "sam",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn test_bulk_create_reports_per_item_failures() {
    let router = setup();
    let (status, body) = send(
        &router,
        "POST",
        "/shifts/bulk",
        "mgr",
        Some(json!({
            "shifts": [
                shift_body("sam", "2026-03-02", "08:00", "16:00"),
                shift_body("sam", "2026-03-02", "10:00", "18:00"),
                shift_body("sam", "2026-03-03", "08:00", "16:00"),
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"].as_array().unwrap().len(), 2);
    let failures = body["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["index"], 1);
    assert_eq!(failures[0]["code"], "SHIFT_OVERLAP");
}

#[tokio::test]
async fn test_copy_week_recreates_shifts_one_week_later() {
    let router = setup();
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let (status, body) = send(
        &router,
        "POST",
        "/shifts/copy-week",
        "mgr",
        Some(json!({
            "source_week_start": "2026-03-02",
            "target_week_start": "2026-03-09",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = body["created"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(body["errors"], json!([]));
    assert!(created[0]["start_time"]
        .as_str()
        .unwrap()
        .starts_with("2026-03-08T22:00:00"));
}

#[tokio::test]
async fn test_insufficient_balance_reports_remaining_and_required() {
    let router = setup();
    // 15 workdays x 480 = 7200 minutes against 6720 remaining.
    let (status, body) = send(
        &router,
        "POST",
        "/leave-requests",
        "lee",
        Some(json!({
            "leave_code": "ANNUAL",
            "unit": "DAY",
            "start_date": "2026-03-02",
            "end_date": "2026-03-16",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "LEAVE_BALANCE_INSUFFICIENT");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("6720") && message.contains("7200"));
}

#[tokio::test]
async fn test_negative_adjustment_rejected_and_row_unchanged() {
    let router = setup();
    let (status, body) = send(
        &router,
        "POST",
        "/leave-balances/adjust",
        "mgr",
        Some(json!({
            "employee_id": "lee",
            "leave_code": "ANNUAL",
            "year": 2026,
            "delta_minutes": -7000,
            "reason": "typo",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "NEGATIVE_BALANCE");

    let (_, body) = send(&router, "GET", "/leave-balances?employee_id=lee", "mgr", None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows[0]["adjusted_minutes"], 0);
    assert_eq!(rows[0]["remaining_minutes"], 6720);
}

#[tokio::test]
async fn test_leave_approval_cascades_to_overlapping_shifts_only() {
    let router = setup();
    let (_, inside) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("lee", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let (_, outside) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("lee", "2026-03-09", "08:00", "16:00")),
    )
    .await;

    let (status, request) = send(
        &router,
        "POST",
        "/leave-requests",
        "lee",
        Some(json!({
            "leave_code": "ANNUAL",
            "unit": "DAY",
            "start_date": "2026-03-02",
            "end_date": "2026-03-03",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "PENDING");
    let request_id = request["id"].as_str().unwrap().to_string();

    let (status, approval) = send(
        &router,
        "PATCH",
        &format!("/leave-requests/{request_id}/status"),
        "mgr",
        Some(json!({"status": "APPROVED", "manager_note": "enjoy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["status"], "APPROVED");
    assert_eq!(
        approval["cancelled_shift_ids"],
        json!([inside["id"].as_str().unwrap()])
    );

    let (_, shifts) = send(&router, "GET", "/shifts?employee_id=lee", "mgr", None).await;
    for row in shifts.as_array().unwrap() {
        let expected = if row["id"] == inside["id"] {
            "CANCELLED"
        } else {
            "PUBLISHED"
        };
        assert_eq!(row["status"], expected, "shift {}", row["id"]);
        if row["id"] == inside["id"] {
            assert_eq!(row["cancelled_by_leave"].as_str().unwrap(), request_id);
        }
    }
    assert_eq!(outside["status"], "PUBLISHED");

    // Two workdays debited from the ledger.
    let (_, balances) = send(&router, "GET", "/leave-balances?employee_id=lee", "mgr", None).await;
    assert_eq!(balances[0]["used_minutes"], 960);
    assert_eq!(balances[0]["remaining_minutes"], 6720 - 960);
}

#[tokio::test]
async fn test_employee_cancels_own_request_but_not_others() {
    let router = setup();
    let (_, request) = send(
        &router,
        "POST",
        "/leave-requests",
        "lee",
        Some(json!({
            "leave_code": "ANNUAL",
            "unit": "DAY",
            "start_date": "2026-03-02",
            "end_date": "2026-03-02",
        })),
    )
    .await;
    let request_id = request["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        "PATCH",
        &format!("/leave-requests/{request_id}/status"),
        "sam",
        Some(json!({"status": "CANCELLED"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &router,
        "PATCH",
        &format!("/leave-requests/{request_id}/status"),
        "lee",
        Some(json!({"status": "CANCELLED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn test_delete_leave_request_returns_no_content() {
    let router = setup();
    let (_, request) = send(
        &router,
        "POST",
        "/leave-requests",
        "lee",
        Some(json!({
            "leave_code": "ANNUAL",
            "unit": "DAY",
            "start_date": "2026-03-02",
            "end_date": "2026-03-02",
        })),
    )
    .await;
    let request_id = request["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        "DELETE",
        &format!("/leave-requests/{request_id}"),
        "lee",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, rows) = send(&router, "GET", "/leave-requests", "mgr", None).await;
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_swap_flow_reassigns_shift() {
    let router = setup();
    let (_, shift) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let shift_id = shift["id"].as_str().unwrap().to_string();

    let (status, swap) = send(
        &router,
        "POST",
        "/swaps",
        "sam",
        Some(json!({"shift_id": shift_id, "target_employee_id": "ot"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(swap["status"], "PENDING");
    let swap_id = swap["id"].as_str().unwrap().to_string();

    let (status, approval) = send(
        &router,
        "POST",
        &format!("/swaps/{swap_id}/approve"),
        "mgr",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["status"], "APPROVED");
    assert_eq!(approval["new_shift"]["employee_id"], "ot");
    assert_eq!(approval["new_shift"]["start_time"], shift["start_time"]);

    let (_, shifts) = send(&router, "GET", "/shifts", "mgr", None).await;
    let statuses: Vec<(&str, &str)> = shifts
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["employee_id"].as_str().unwrap(),
                row["status"].as_str().unwrap(),
            )
        })
        .collect();
    assert!(statuses.contains(&("sam", "SWAPPED")));
    assert!(statuses.contains(&("ot", "PUBLISHED")));
}

#[tokio::test]
async fn test_swap_target_named_at_approval_time() {
    let router = setup();
    let (_, shift) = send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("sam", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let shift_id = shift["id"].as_str().unwrap().to_string();

    // No target yet; the manager names one when approving.
    let (status, swap) = send(
        &router,
        "POST",
        "/swaps",
        "sam",
        Some(json!({"shift_id": shift_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let swap_id = swap["id"].as_str().unwrap().to_string();

    let (status, approval) = send(
        &router,
        "POST",
        &format!("/swaps/{swap_id}/approve"),
        "mgr",
        Some(json!({"target_employee_id": "ot"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["status"], "APPROVED");
    assert_eq!(approval["target_employee_id"], "ot");
    assert_eq!(approval["new_shift"]["employee_id"], "ot");
}

#[tokio::test]
async fn test_weekly_overtime_split_and_pay() {
    let router = setup();
    // Five 9h days: 2700 planned minutes against a 2400-minute cap.
    for day in ["2026-03-02", "2026-03-03", "2026-03-04", "2026-03-05", "2026-03-06"] {
        let (status, _) = send(
            &router,
            "POST",
            "/shifts",
            "mgr",
            Some(shift_body("ot", day, "08:00", "17:00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, report) = send(
        &router,
        "GET",
        "/overtime?week_start=2026-03-02&strategy=PLANNED&employee_id=ot",
        "mgr",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["week_start"], "2026-03-02");
    assert_eq!(report["strategy"], "PLANNED");
    let row = &report["rows"][0];
    assert_eq!(row["planned_minutes"], 2700);
    assert_eq!(row["regular_minutes"], 2400);
    assert_eq!(row["overtime_minutes"], 300);
    // 40h at 30.00 plus 5h at 45.00.
    let pay: Decimal = row["estimated_pay"].as_str().unwrap().parse().unwrap();
    assert_eq!(pay, Decimal::new(142500, 2));
}

#[tokio::test]
async fn test_overtime_report_for_employee_is_self_only() {
    let router = setup();
    let (status, report) = send(
        &router,
        "GET",
        "/overtime?week_start=2026-03-02&strategy=PLANNED",
        "sam",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee_id"], "sam");
}

#[tokio::test]
async fn test_recalculate_persists_snapshot() {
    let router = setup();
    send(
        &router,
        "POST",
        "/shifts",
        "mgr",
        Some(shift_body("ot", "2026-03-02", "08:00", "16:00")),
    )
    .await;
    let (status, report) = send(
        &router,
        "POST",
        "/overtime/recalculate",
        "mgr",
        Some(json!({
            "week_start": "2026-03-02",
            "strategy": "PLANNED",
            "employee_id": "ot",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["rows"][0]["planned_minutes"], 480);
}
