//! Configuration types for the roster engine.
//!
//! [`EngineSettings`] mirrors the YAML file verbatim; [`EngineConfig`] is the
//! validated form the engine consumes, with wall-clock strings parsed into
//! typed values.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::time::parse_local_time;

/// Timezone section of the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct TimezoneSettings {
    /// Fixed offset from UTC in minutes (e.g. 600 for UTC+10). No DST.
    pub offset_minutes: i32,
}

/// Overtime section of the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimeSettings {
    /// Multiplier applied to the hourly rate for overtime minutes.
    pub multiplier: Decimal,
}

/// Leave section of the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveSettings {
    /// Default local start time (`HH:mm`) for a half-day leave request.
    pub half_day_start: String,
    /// Default local end time (`HH:mm`) for a half-day leave request.
    pub half_day_end: String,
    /// Minutes a whole-day leave charges against the balance ledger.
    #[serde(default = "default_workday_minutes")]
    pub workday_minutes: i64,
}

fn default_workday_minutes() -> i64 {
    DEFAULT_WORKDAY_MINUTES
}

/// Ledger charge for one day of DAY-unit leave when the settings file does
/// not say otherwise (an eight-hour working day).
pub const DEFAULT_WORKDAY_MINUTES: i64 = 480;

/// The raw settings file structure (`engine.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Timezone settings.
    pub timezone: TimezoneSettings,
    /// Overtime settings.
    pub overtime: OvertimeSettings,
    /// Leave settings.
    pub leave: LeaveSettings,
}

/// Validated engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed offset from UTC in minutes, threaded through all time math.
    pub offset_minutes: i32,
    /// Overtime pay multiplier.
    pub overtime_multiplier: Decimal,
    /// Default local start time of a half-day leave.
    pub half_day_start: NaiveTime,
    /// Default local end time of a half-day leave.
    pub half_day_end: NaiveTime,
    /// Ledger charge, in minutes, for one day of DAY-unit leave.
    pub workday_minutes: i64,
}

impl EngineConfig {
    /// Builds a config directly from typed values, with the default
    /// whole-day leave charge.
    pub fn new(
        offset_minutes: i32,
        overtime_multiplier: Decimal,
        half_day_start: NaiveTime,
        half_day_end: NaiveTime,
    ) -> Self {
        Self {
            offset_minutes,
            overtime_multiplier,
            half_day_start,
            half_day_end,
            workday_minutes: DEFAULT_WORKDAY_MINUTES,
        }
    }

    /// Validates raw settings into a config.
    pub fn from_settings(settings: EngineSettings) -> EngineResult<Self> {
        let half_day_start = parse_local_time(&settings.leave.half_day_start)?;
        let half_day_end = parse_local_time(&settings.leave.half_day_end)?;
        if half_day_start >= half_day_end {
            return Err(EngineError::Validation {
                message: "half_day_start must be before half_day_end".to_string(),
            });
        }
        let workday_minutes = settings.leave.workday_minutes;
        if workday_minutes <= 0 || workday_minutes > i64::from(crate::time::MINUTES_PER_DAY) {
            return Err(EngineError::Validation {
                message: "workday_minutes must be between 1 and 1440".to_string(),
            });
        }
        Ok(Self {
            offset_minutes: settings.timezone.offset_minutes,
            overtime_multiplier: settings.overtime.multiplier,
            half_day_start,
            half_day_end,
            workday_minutes,
        })
    }
}
