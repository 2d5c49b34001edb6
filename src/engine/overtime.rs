//! Weekly overtime calculator.
//!
//! Aggregates minutes per employee per week from one of two sources: the
//! planned roster (active shifts) or the actual clocked time entries. Totals
//! are split against the employee's weekly cap and priced at the base rate
//! plus the configured multiplier for the overtime portion. Records are a
//! derived snapshot; shifts and time entries stay authoritative.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{Actor, Employee, OvertimeRecord, OvertimeStrategy};
use crate::store::{Database, Store};
use crate::time::{overlap_minutes, week_window};

const MINUTES_PER_HOUR: i64 = 60;

/// Computes one week of overtime rows without persisting anything.
///
/// Scope defaults to every employee; `employee_id` narrows it to one person
/// and `department` to one department. Minutes are clipped to the week window
/// `[weekStart, weekStart+7d)`, so a cross-boundary shift contributes only
/// its in-window portion. Rows come back sorted by employee id.
pub fn calculate_weekly_overtime(
    store: &Store,
    config: &EngineConfig,
    week_start: NaiveDate,
    strategy: OvertimeStrategy,
    employee_id: Option<&str>,
    department: Option<&str>,
) -> EngineResult<Vec<OvertimeRecord>> {
    store.read(|db| calculate_in(db, config, week_start, strategy, employee_id, department))
}

fn calculate_in(
    db: &Database,
    config: &EngineConfig,
    week_start: NaiveDate,
    strategy: OvertimeStrategy,
    employee_id: Option<&str>,
    department: Option<&str>,
) -> EngineResult<Vec<OvertimeRecord>> {
    let (window_start, window_end) = week_window(week_start, config.offset_minutes);

    let mut employees: Vec<&Employee> = db
        .employees
        .values()
        .filter(|e| employee_id.is_none_or(|id| e.id == id))
        .filter(|e| department.is_none_or(|d| e.department == d))
        .collect();
    employees.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(id) = employee_id {
        // An explicit employee filter must resolve.
        db.employee(id)?;
    }

    let mut rows = Vec::with_capacity(employees.len());
    for employee in employees {
        let total = match strategy {
            OvertimeStrategy::Planned => db
                .shifts_for(&employee.id)
                .filter(|s| s.is_active())
                .map(|s| overlap_minutes(s.start_time, s.end_time, window_start, window_end))
                .sum(),
            OvertimeStrategy::Actual => db
                .time_entries
                .iter()
                .filter(|e| e.employee_id == employee.id)
                .filter_map(|e| {
                    e.clock_out
                        .map(|out| overlap_minutes(e.clock_in, out, window_start, window_end))
                })
                .sum(),
        };
        rows.push(build_record(config, employee, week_start, strategy, total));
    }
    Ok(rows)
}

fn build_record(
    config: &EngineConfig,
    employee: &Employee,
    week_start: NaiveDate,
    strategy: OvertimeStrategy,
    total_minutes: i64,
) -> OvertimeRecord {
    let cap = employee.max_weekly_minutes;
    let regular_minutes = total_minutes.min(cap);
    let overtime_minutes = (total_minutes - cap).max(0);

    let per_minute = employee.hourly_rate / Decimal::from(MINUTES_PER_HOUR);
    let estimated_pay = (Decimal::from(regular_minutes) * per_minute
        + Decimal::from(overtime_minutes) * per_minute * config.overtime_multiplier)
        .round_dp(2);

    OvertimeRecord {
        employee_id: employee.id.clone(),
        week_start,
        strategy,
        planned_minutes: if strategy == OvertimeStrategy::Planned {
            total_minutes
        } else {
            0
        },
        actual_minutes: if strategy == OvertimeStrategy::Actual {
            total_minutes
        } else {
            0
        },
        regular_minutes,
        overtime_minutes,
        overtime_multiplier: config.overtime_multiplier,
        estimated_pay,
    }
}

/// Recomputes one week and persists the rows as an upsert per employee,
/// keyed by (employee, week start, strategy).
///
/// Only the minutes field of the requested strategy is overwritten on an
/// existing row; the other strategy's cached minutes are left as they were.
pub fn recalculate_weekly_overtime(
    store: &Store,
    config: &EngineConfig,
    actor: &Actor,
    week_start: NaiveDate,
    strategy: OvertimeStrategy,
    employee_id: Option<&str>,
    department: Option<&str>,
) -> EngineResult<Vec<OvertimeRecord>> {
    store.transaction(|db| {
        let rows = calculate_in(db, config, week_start, strategy, employee_id, department)?;
        for row in &rows {
            let key = (row.employee_id.clone(), week_start, strategy);
            let merged = match db.overtime_records.get(&key) {
                Some(existing) => {
                    let mut updated = row.clone();
                    match strategy {
                        OvertimeStrategy::Planned => updated.actual_minutes = existing.actual_minutes,
                        OvertimeStrategy::Actual => updated.planned_minutes = existing.planned_minutes,
                    }
                    updated
                }
                None => row.clone(),
            };
            db.overtime_records.insert(key, merged);
        }
        db.record_audit(
            &actor.employee_id,
            "overtime.recalculate",
            format!(
                "recomputed {} {strategy} overtime row(s) for week of {week_start}",
                rows.len()
            ),
        );
        Ok(rows)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Shift, ShiftStatus, TimeEntry};
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn config() -> EngineConfig {
        EngineConfig::new(
            600,
            Decimal::new(15, 1),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(id: &str, department: &str, cap: i64, rate: Decimal) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_string(),
            department: department.to_string(),
            role: Role::Employee,
            max_weekly_minutes: cap,
            hourly_rate: rate,
        }
    }

    fn shift_on(employee_id: &str, day: NaiveDate, from: u32, hours: i64) -> Shift {
        let start = crate::time::local_date_time_to_instant(
            day,
            NaiveTime::from_hms_opt(from, 0, 0).unwrap(),
            600,
        );
        Shift {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            start_time: start,
            end_time: start + chrono::Duration::hours(hours),
            status: ShiftStatus::Published,
            note: None,
            cancelled_by_leave: None,
        }
    }

    fn store_with(employees: Vec<Employee>, shifts: Vec<Shift>) -> Store {
        let mut db = Database::default();
        for e in employees {
            db.employees.insert(e.id.clone(), e);
        }
        for s in shifts {
            db.shifts.insert(s.id, s);
        }
        Store::with_database(db)
    }

    #[test]
    fn test_planned_split_at_cap_and_pay_with_multiplier() {
        // 40h cap, 45h planned across the week: 2400 regular + 300 overtime.
        let week = date(2026, 3, 2);
        let shifts = (0..5)
            .map(|d| shift_on("e1", week + chrono::Duration::days(d), 8, 9))
            .collect();
        let store = store_with(
            vec![employee("e1", "ops", 2400, Decimal::new(3000, 2))],
            shifts,
        );

        let rows = calculate_weekly_overtime(
            &store,
            &config(),
            week,
            OvertimeStrategy::Planned,
            None,
            None,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.planned_minutes, 2700);
        assert_eq!(row.actual_minutes, 0);
        assert_eq!(row.regular_minutes, 2400);
        assert_eq!(row.overtime_minutes, 300);
        // 40h at 30.00 + 5h at 45.00 = 1200 + 225.
        assert_eq!(row.estimated_pay, Decimal::new(142500, 2));
    }

    #[test]
    fn test_cancelled_and_swapped_shifts_are_excluded_from_planned() {
        let week = date(2026, 3, 2);
        let mut cancelled = shift_on("e1", week, 8, 8);
        cancelled.status = ShiftStatus::Cancelled;
        let mut swapped = shift_on("e1", date(2026, 3, 3), 8, 8);
        swapped.status = ShiftStatus::Swapped;
        let kept = shift_on("e1", date(2026, 3, 4), 8, 8);
        let store = store_with(
            vec![employee("e1", "ops", 2400, Decimal::new(3000, 2))],
            vec![cancelled, swapped, kept],
        );

        let rows = calculate_weekly_overtime(
            &store,
            &config(),
            week,
            OvertimeStrategy::Planned,
            None,
            None,
        )
        .unwrap();
        assert_eq!(rows[0].planned_minutes, 480);
    }

    #[test]
    fn test_cross_boundary_shift_contributes_only_in_window_portion() {
        // Sunday 22:00 local to Monday 06:00: 2h fall before the Monday week.
        let week = date(2026, 3, 2);
        let store = store_with(
            vec![employee("e1", "ops", 2400, Decimal::new(3000, 2))],
            vec![shift_on("e1", date(2026, 3, 1), 22, 8)],
        );
        let rows = calculate_weekly_overtime(
            &store,
            &config(),
            week,
            OvertimeStrategy::Planned,
            None,
            None,
        )
        .unwrap();
        assert_eq!(rows[0].planned_minutes, 360);
    }

    #[test]
    fn test_actual_strategy_uses_closed_entries_only() {
        let week = date(2026, 3, 2);
        let clock_in = crate::time::local_date_time_to_instant(
            week,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            600,
        );
        let mut db = Database::default();
        let e = employee("e1", "ops", 2400, Decimal::new(3000, 2));
        db.employees.insert(e.id.clone(), e);
        db.time_entries.push(TimeEntry {
            id: Uuid::new_v4(),
            employee_id: "e1".to_string(),
            clock_in,
            clock_out: Some(clock_in + chrono::Duration::minutes(503)),
        });
        // Still clocked in; ignored.
        db.time_entries.push(TimeEntry {
            id: Uuid::new_v4(),
            employee_id: "e1".to_string(),
            clock_in: clock_in + chrono::Duration::days(1),
            clock_out: None,
        });
        let store = Store::with_database(db);

        let rows = calculate_weekly_overtime(
            &store,
            &config(),
            week,
            OvertimeStrategy::Actual,
            None,
            None,
        )
        .unwrap();
        assert_eq!(rows[0].actual_minutes, 503);
        assert_eq!(rows[0].planned_minutes, 0);
        assert_eq!(rows[0].regular_minutes, 503);
        assert_eq!(rows[0].overtime_minutes, 0);
    }

    #[test]
    fn test_department_filter_and_ordering() {
        let week = date(2026, 3, 2);
        let store = store_with(
            vec![
                employee("b", "ops", 2400, Decimal::new(3000, 2)),
                employee("a", "ops", 2400, Decimal::new(3000, 2)),
                employee("c", "sales", 2400, Decimal::new(3000, 2)),
            ],
            vec![],
        );
        let rows = calculate_weekly_overtime(
            &store,
            &config(),
            week,
            OvertimeStrategy::Planned,
            None,
            Some("ops"),
        )
        .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_unknown_employee_filter_is_not_found() {
        let store = store_with(vec![], vec![]);
        let err = calculate_weekly_overtime(
            &store,
            &config(),
            date(2026, 3, 2),
            OvertimeStrategy::Planned,
            Some("ghost"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::EngineError::NotFound { .. }));
    }

    #[test]
    fn test_recalculate_upserts_and_preserves_other_strategy_minutes() {
        let week = date(2026, 3, 2);
        let store = store_with(
            vec![employee("e1", "ops", 2400, Decimal::new(3000, 2))],
            vec![shift_on("e1", week, 8, 8)],
        );
        let manager = Actor {
            employee_id: "m1".to_string(),
            role: Role::Manager,
            department: "ops".to_string(),
        };

        recalculate_weekly_overtime(
            &store,
            &config(),
            &manager,
            week,
            OvertimeStrategy::Planned,
            None,
            None,
        )
        .unwrap();

        // Seed a stale actual figure on the planned row's sibling key, then
        // recompute planned again: the row keeps its own fields per strategy.
        store.read(|db| {
            let key = ("e1".to_string(), week, OvertimeStrategy::Planned);
            let row = db.overtime_records.get(&key).unwrap();
            assert_eq!(row.planned_minutes, 480);
        });

        store
            .transaction(|db| {
                let key = ("e1".to_string(), week, OvertimeStrategy::Planned);
                if let Some(row) = db.overtime_records.get_mut(&key) {
                    row.actual_minutes = 123;
                }
                Ok(())
            })
            .unwrap();

        recalculate_weekly_overtime(
            &store,
            &config(),
            &manager,
            week,
            OvertimeStrategy::Planned,
            None,
            None,
        )
        .unwrap();

        store.read(|db| {
            let key = ("e1".to_string(), week, OvertimeStrategy::Planned);
            let row = db.overtime_records.get(&key).unwrap();
            assert_eq!(row.planned_minutes, 480);
            assert_eq!(row.actual_minutes, 123);
            assert!(db.audit_log.iter().any(|e| e.action == "overtime.recalculate"));
        });
    }
}
