//! Availability matching.
//!
//! Given an employee, a candidate shift interval, and the recurring weekly
//! availability rules, this module decides which rules intersect the shift
//! and whether the intersection blocks the shift, merely warns, or violates
//! an available-only boundary. Because availability rules are inherently
//! per-weekday, a shift crossing local midnight is evaluated as two
//! independent single-day checks, never as one continuous interval.

use chrono::{DateTime, Utc, Weekday};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AvailabilityBlock, AvailabilityType};
use crate::store::Database;
use crate::time::{intervals_overlap, local_date, local_weekday, minute_of_day, MINUTES_PER_DAY};

/// One day-local portion of a candidate shift.
///
/// Day 1 runs from the shift start to local midnight (or the shift end when
/// the shift does not cross midnight); day 2 runs from local midnight to the
/// shift end. The probe instant anchors the block's optional effective-date
/// window to the segment's own calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySegment {
    /// The weekday this portion falls on.
    pub day: Weekday,
    /// Minute-of-day the portion starts at.
    pub start_minute: u32,
    /// Minute-of-day the portion ends at (1440 when it runs to day's end).
    pub end_minute: u32,
    /// The instant used to test a block's effective date window.
    pub probe: DateTime<Utc>,
}

/// Splits a candidate interval into its day-local segments.
///
/// Returns one segment for a same-day shift, two when the shift crosses
/// local midnight. A shift ending exactly at midnight produces only the
/// first segment.
pub fn day_segments(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    offset_minutes: i32,
) -> Vec<DaySegment> {
    let start_minute = minute_of_day(start, offset_minutes);
    let end_minute = minute_of_day(end, offset_minutes);
    let same_day = local_date(start, offset_minutes) == local_date(end, offset_minutes);

    if same_day {
        return vec![DaySegment {
            day: local_weekday(start, offset_minutes),
            start_minute,
            end_minute,
            probe: start,
        }];
    }

    let mut segments = vec![DaySegment {
        day: local_weekday(start, offset_minutes),
        start_minute,
        end_minute: MINUTES_PER_DAY,
        probe: start,
    }];
    // Ending exactly at midnight touches the next day without entering it.
    if end_minute > 0 {
        segments.push(DaySegment {
            day: local_weekday(end, offset_minutes),
            start_minute: 0,
            end_minute,
            probe: end,
        });
    }
    segments
}

/// Evaluates every availability rule against the candidate interval.
///
/// Returns the accumulated warning strings on acceptance:
/// - UNAVAILABLE intersections reject with [`EngineError::UnavailableConflict`]
///   unless `force_override`, which converts them to a warning naming the day.
/// - PREFER_NOT intersections always pass with an advisory warning.
/// - AVAILABLE_ONLY rules whose window does not fully contain the candidate
///   segment reject with [`EngineError::AvailableOnlyConflict`] unless
///   `force_override`.
pub fn check_availability(
    db: &Database,
    config: &EngineConfig,
    employee_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    force_override: bool,
) -> EngineResult<Vec<String>> {
    let mut warnings = Vec::new();

    for segment in day_segments(start, end, config.offset_minutes) {
        let date = local_date(segment.probe, config.offset_minutes);
        for block in db.blocks_for(employee_id, segment.day) {
            if !block.applies_on(date) {
                continue;
            }
            match block.block_type {
                AvailabilityType::Unavailable => {
                    if let Some(warning) =
                        evaluate_unavailable(block, &segment, force_override)?
                    {
                        warnings.push(warning);
                    }
                }
                AvailabilityType::PreferNot => {
                    if let Some(warning) = evaluate_prefer_not(block, &segment) {
                        warnings.push(warning);
                    }
                }
                AvailabilityType::AvailableOnly => {
                    if let Some(warning) =
                        evaluate_available_only(block, &segment, force_override)?
                    {
                        warnings.push(warning);
                    }
                }
            }
        }
    }

    Ok(warnings)
}

/// An UNAVAILABLE rule blocks any intersection unless overridden.
fn evaluate_unavailable(
    block: &AvailabilityBlock,
    segment: &DaySegment,
    force_override: bool,
) -> EngineResult<Option<String>> {
    let (block_start, block_end) = block.minute_window();
    if !intervals_overlap(segment.start_minute, segment.end_minute, block_start, block_end) {
        return Ok(None);
    }
    if force_override {
        Ok(Some(format!(
            "Unavailable block on {} overridden ({})",
            segment.day,
            window_label(block_start, block_end)
        )))
    } else {
        Err(EngineError::UnavailableConflict { day: segment.day })
    }
}

/// A PREFER_NOT rule never blocks; any intersection is advisory.
fn evaluate_prefer_not(block: &AvailabilityBlock, segment: &DaySegment) -> Option<String> {
    let (block_start, block_end) = block.minute_window();
    if !intervals_overlap(segment.start_minute, segment.end_minute, block_start, block_end) {
        return None;
    }
    Some(format!(
        "Employee prefers not to work on {} ({})",
        segment.day,
        window_label(block_start, block_end)
    ))
}

/// An AVAILABLE_ONLY rule requires the segment to sit fully inside its
/// window; a partial intersection or escape is a boundary violation.
fn evaluate_available_only(
    block: &AvailabilityBlock,
    segment: &DaySegment,
    force_override: bool,
) -> EngineResult<Option<String>> {
    let (block_start, block_end) = block.minute_window();
    if !intervals_overlap(segment.start_minute, segment.end_minute, block_start, block_end) {
        return Ok(None);
    }
    let contained = segment.start_minute >= block_start && segment.end_minute <= block_end;
    if contained {
        return Ok(None);
    }
    if force_override {
        Ok(Some(format!(
            "Shift extends outside the available-only window on {} ({}), overridden",
            segment.day,
            window_label(block_start, block_end)
        )))
    } else {
        Err(EngineError::AvailableOnlyConflict { day: segment.day })
    }
}

fn window_label(start_minute: u32, end_minute: u32) -> String {
    format!(
        "{:02}:{:02}-{:02}:{:02}",
        start_minute / 60,
        start_minute % 60,
        end_minute / 60,
        end_minute % 60
    )
}
