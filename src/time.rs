//! Time interval utilities.
//!
//! Pure functions converting calendar dates, days of week, and local
//! wall-clock times under a fixed UTC offset into comparable minute-of-day
//! and absolute-instant values. The offset is configuration, threaded through
//! every function rather than baked in, so the same logic is testable against
//! any offset. There is no daylight-saving adjustment.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
    Weekday,
};

use crate::error::{EngineError, EngineResult};

/// Number of minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Combines a calendar date and a local wall-clock time under a fixed UTC
/// offset into an absolute instant.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
/// use roster_engine::time::local_date_time_to_instant;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
/// let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// // Local 09:00 at UTC+10 is 23:00 UTC the previous day.
/// let instant = local_date_time_to_instant(date, time, 600);
/// assert_eq!(instant, Utc.with_ymd_and_hms(2026, 1, 5, 23, 0, 0).unwrap());
/// ```
pub fn local_date_time_to_instant(
    date: NaiveDate,
    time: NaiveTime,
    offset_minutes: i32,
) -> DateTime<Utc> {
    let local = NaiveDateTime::new(date, time);
    Utc.from_utc_datetime(&(local - Duration::minutes(i64::from(offset_minutes))))
}

/// Converts an instant back to the local wall-clock datetime it represents
/// under the fixed offset.
pub fn instant_to_local(instant: DateTime<Utc>, offset_minutes: i32) -> NaiveDateTime {
    instant.naive_utc() + Duration::minutes(i64::from(offset_minutes))
}

/// Returns the local calendar date an instant falls on.
pub fn local_date(instant: DateTime<Utc>, offset_minutes: i32) -> NaiveDate {
    instant_to_local(instant, offset_minutes).date()
}

/// Returns the local weekday an instant falls on.
pub fn local_weekday(instant: DateTime<Utc>, offset_minutes: i32) -> Weekday {
    local_date(instant, offset_minutes).weekday()
}

/// Returns `hour * 60 + minute` of the local day the instant falls in.
pub fn minute_of_day(instant: DateTime<Utc>, offset_minutes: i32) -> u32 {
    let local = instant_to_local(instant, offset_minutes);
    local.time().hour() * 60 + local.time().minute()
}

/// Returns the instant of local midnight at the start of the given date.
pub fn local_midnight(date: NaiveDate, offset_minutes: i32) -> DateTime<Utc> {
    local_date_time_to_instant(date, NaiveTime::MIN, offset_minutes)
}

/// Strict half-open overlap test: `[a_start, a_end)` against `[b_start, b_end)`.
///
/// Two intervals overlap iff `a_start < b_end && a_end > b_start`. A shift
/// ending exactly when another starts is adjacent, NOT a conflict; this exact
/// semantics is relied on by every overlap check in the engine.
///
/// # Example
///
/// ```
/// use roster_engine::time::intervals_overlap;
///
/// assert!(intervals_overlap(0, 10, 5, 15));
/// assert!(!intervals_overlap(0, 10, 10, 20)); // touching
/// ```
pub fn intervals_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

/// Returns the length in minutes of the intersection of two instant
/// intervals, zero when they do not overlap.
pub fn overlap_minutes(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> i64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end > start {
        (end - start).num_minutes()
    } else {
        0
    }
}

/// Parses a `HH:mm` local wall-clock time.
pub fn parse_local_time(s: &str) -> EngineResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| EngineError::Validation {
        message: format!("invalid time of day '{s}', expected HH:mm"),
    })
}

/// Returns the `[start, end)` instant window for the week beginning at the
/// given local date.
pub fn week_window(week_start: NaiveDate, offset_minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(week_start, offset_minutes);
    (start, start + Duration::days(7))
}
