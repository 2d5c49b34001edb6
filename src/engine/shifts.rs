//! Shift creation, mutation, and bulk operations.
//!
//! Owns the no-double-booking invariant: for a given employee, no two
//! non-cancelled shifts may overlap. Every accepted mutation re-runs its
//! overlap scan and availability checks inside the same store transaction
//! that persists the shift, so two concurrent submissions for the same
//! employee and window cannot both slip through.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Shift, ShiftStatus};
use crate::store::{Database, Store};
use crate::time::week_window;

use super::availability::check_availability;

/// Input for creating a single shift.
#[derive(Debug, Clone)]
pub struct NewShift {
    /// The employee to schedule.
    pub employee_id: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_time: DateTime<Utc>,
    /// Optional free-form note.
    pub note: Option<String>,
    /// Schedule despite UNAVAILABLE / AVAILABLE_ONLY conflicts, downgrading
    /// them to warnings.
    pub force_override: bool,
}

/// A persisted shift together with the availability warnings its acceptance
/// produced (empty when none).
#[derive(Debug, Clone, Serialize)]
pub struct ShiftWithWarnings {
    /// The persisted shift.
    #[serde(flatten)]
    pub shift: Shift,
    /// Advisory and override warnings accumulated during validation.
    pub warnings: Vec<String>,
}

/// Partial update for an existing shift; absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ShiftPatch {
    /// New start instant.
    pub start_time: Option<DateTime<Utc>>,
    /// New end instant.
    pub end_time: Option<DateTime<Utc>>,
    /// New note (replaces the existing note when present).
    pub note: Option<String>,
    /// Override flag for this validation pass.
    pub force_override: bool,
}

/// A per-item failure in a bulk operation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    /// Position of the failed item in the submitted list.
    pub index: usize,
    /// Stable error code of the failure.
    pub code: String,
    /// Human-readable failure message.
    pub message: String,
}

/// Outcome of [`bulk_create`]: successes plus per-item failures.
#[derive(Debug, Clone, Serialize)]
pub struct BulkOutcome {
    /// Shifts that were created, with their warnings.
    pub created: Vec<ShiftWithWarnings>,
    /// Items that were rejected; their failure never blocks other items.
    pub failures: Vec<BulkFailure>,
}

/// A source shift that could not be copied into the target week.
#[derive(Debug, Clone, Serialize)]
pub struct CopyWeekError {
    /// The source shift that was skipped.
    pub source_shift_id: Uuid,
    /// Stable error code of the failure.
    pub code: String,
    /// Human-readable failure message.
    pub message: String,
}

/// Outcome of [`copy_week`]: created shifts plus skipped source shifts.
#[derive(Debug, Clone, Serialize)]
pub struct CopyWeekOutcome {
    /// Shifts created in the target week.
    pub created: Vec<ShiftWithWarnings>,
    /// Source shifts that were skipped, with the reason.
    pub errors: Vec<CopyWeekError>,
}

/// Validates and persists a new shift.
///
/// Rejections, in order: `InvalidTimeRange` when start >= end, `NotFound` for
/// an unknown employee, `ShiftOverlap` against any non-cancelled shift of the
/// employee, then the availability verdicts of
/// [`check_availability`](super::check_availability). On acceptance the shift
/// is persisted as PUBLISHED and returned with the accumulated warnings.
pub fn create_shift(
    store: &Store,
    config: &EngineConfig,
    input: NewShift,
) -> EngineResult<ShiftWithWarnings> {
    store.transaction(|db| create_shift_in(db, config, &input))
}

fn create_shift_in(
    db: &mut Database,
    config: &EngineConfig,
    input: &NewShift,
) -> EngineResult<ShiftWithWarnings> {
    validate_time_range(input.start_time, input.end_time)?;
    db.employee(&input.employee_id)?;
    scan_for_overlap(db, &input.employee_id, input.start_time, input.end_time, None)?;

    let warnings = check_availability(
        db,
        config,
        &input.employee_id,
        input.start_time,
        input.end_time,
        input.force_override,
    )?;

    let shift = Shift {
        id: Uuid::new_v4(),
        employee_id: input.employee_id.clone(),
        start_time: input.start_time,
        end_time: input.end_time,
        status: ShiftStatus::Published,
        note: input.note.clone(),
        cancelled_by_leave: None,
    };
    db.shifts.insert(shift.id, shift.clone());

    Ok(ShiftWithWarnings { shift, warnings })
}

/// Re-validates and persists an update to an existing shift.
///
/// The merged (existing ∪ proposed) fields go through the same checks as
/// creation, with the shift's own id excluded from the overlap scan.
pub fn update_shift(
    store: &Store,
    config: &EngineConfig,
    shift_id: Uuid,
    patch: ShiftPatch,
) -> EngineResult<ShiftWithWarnings> {
    store.transaction(|db| {
        let existing = db.shift(shift_id)?.clone();
        let start = patch.start_time.unwrap_or(existing.start_time);
        let end = patch.end_time.unwrap_or(existing.end_time);
        let note = patch.note.clone().or(existing.note.clone());

        validate_time_range(start, end)?;
        scan_for_overlap(db, &existing.employee_id, start, end, Some(shift_id))?;
        let warnings = check_availability(
            db,
            config,
            &existing.employee_id,
            start,
            end,
            patch.force_override,
        )?;

        let updated = Shift {
            start_time: start,
            end_time: end,
            note,
            ..existing
        };
        db.shifts.insert(shift_id, updated.clone());

        Ok(ShiftWithWarnings {
            shift: updated,
            warnings,
        })
    })
}

/// Cancels a shift: a pure status transition, no validation beyond existence.
pub fn cancel_shift(store: &Store, shift_id: Uuid) -> EngineResult<Shift> {
    store.transaction(|db| {
        let shift = db
            .shifts
            .get_mut(&shift_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "shift".to_string(),
                id: shift_id.to_string(),
            })?;
        shift.status = ShiftStatus::Cancelled;
        Ok(shift.clone())
    })
}

/// Acknowledges a shift. Only legal from PUBLISHED.
pub fn acknowledge_shift(store: &Store, shift_id: Uuid) -> EngineResult<Shift> {
    store.transaction(|db| {
        let shift = db
            .shifts
            .get_mut(&shift_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "shift".to_string(),
                id: shift_id.to_string(),
            })?;
        if shift.status != ShiftStatus::Published {
            return Err(EngineError::InvalidStatus {
                expected: "PUBLISHED".to_string(),
                actual: format!("{:?}", shift.status).to_uppercase(),
            });
        }
        shift.status = ShiftStatus::Acknowledged;
        Ok(shift.clone())
    })
}

/// Applies [`create_shift`] to each element independently.
///
/// Per-item failures are collected, not propagated, and never block
/// subsequent items. Deliberately not one atomic unit: partial success is
/// the intended semantics.
pub fn bulk_create(
    store: &Store,
    config: &EngineConfig,
    items: Vec<NewShift>,
) -> BulkOutcome {
    let mut outcome = BulkOutcome {
        created: Vec::new(),
        failures: Vec::new(),
    };

    for (index, item) in items.into_iter().enumerate() {
        match create_shift(store, config, item) {
            Ok(created) => outcome.created.push(created),
            Err(err) => outcome.failures.push(BulkFailure {
                index,
                code: err.code().to_string(),
                message: err.to_string(),
            }),
        }
    }

    outcome
}

/// Re-creates every non-cancelled shift of the source week at the same
/// weekday and time offset in the target week.
///
/// Best effort: a shift whose target slot conflicts (overlap or availability)
/// is skipped and recorded as an error entry; the rest of the week still
/// copies.
pub fn copy_week(
    store: &Store,
    config: &EngineConfig,
    source_week_start: NaiveDate,
    target_week_start: NaiveDate,
) -> CopyWeekOutcome {
    let delta = Duration::days((target_week_start - source_week_start).num_days());
    let (window_start, window_end) = week_window(source_week_start, config.offset_minutes);

    let mut sources: Vec<Shift> = store.read(|db| {
        db.shifts
            .values()
            .filter(|s| s.blocks_calendar())
            .filter(|s| s.start_time >= window_start && s.start_time < window_end)
            .cloned()
            .collect()
    });
    sources.sort_by_key(|s| (s.start_time, s.employee_id.clone()));

    let mut outcome = CopyWeekOutcome {
        created: Vec::new(),
        errors: Vec::new(),
    };

    for source in sources {
        let input = NewShift {
            employee_id: source.employee_id.clone(),
            start_time: source.start_time + delta,
            end_time: source.end_time + delta,
            note: source.note.clone(),
            force_override: false,
        };
        match create_shift(store, config, input) {
            Ok(created) => outcome.created.push(created),
            Err(err) => outcome.errors.push(CopyWeekError {
                source_shift_id: source.id,
                code: err.code().to_string(),
                message: err.to_string(),
            }),
        }
    }

    outcome
}

fn validate_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> EngineResult<()> {
    if start >= end {
        return Err(EngineError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// Rejects when any non-cancelled shift of the employee overlaps the
/// half-open candidate interval, excluding `exclude` from the scan.
fn scan_for_overlap(
    db: &Database,
    employee_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> EngineResult<()> {
    let conflict = db
        .shifts_for(employee_id)
        .filter(|s| Some(s.id) != exclude)
        .filter(|s| s.blocks_calendar())
        .any(|s| s.overlaps(start, end));
    if conflict {
        return Err(EngineError::ShiftOverlap {
            employee_id: employee_id.to_string(),
        });
    }
    Ok(())
}
