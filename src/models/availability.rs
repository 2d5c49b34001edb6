//! Recurring weekly availability rules.

use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::MINUTES_PER_DAY;

/// The kind of availability rule, a closed set with one evaluation path per
/// variant in the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityType {
    /// The employee must not be scheduled in this window.
    Unavailable,
    /// Scheduling is allowed but discouraged; produces an advisory warning.
    PreferNot,
    /// The employee may only be scheduled inside this window.
    AvailableOnly,
}

/// A recurring weekly rule limiting when an employee may be scheduled,
/// optionally scoped to a date window.
///
/// There is no uniqueness invariant: multiple overlapping blocks of different
/// types may coexist for the same employee and day, and all are evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    /// Unique identifier for the block.
    pub id: Uuid,
    /// The employee the rule applies to.
    pub employee_id: String,
    /// The kind of rule.
    pub block_type: AvailabilityType,
    /// The weekday the rule recurs on.
    pub day: Weekday,
    /// Local start time of day; absent means from midnight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    /// Local end time of day; absent means to end of day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    /// First date the rule is effective, inclusive; absent means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    /// Last date the rule is effective, inclusive; absent means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
    /// Optional free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AvailabilityBlock {
    /// The block's minute-of-day window, defaulting to the full day when
    /// either bound is absent.
    pub fn minute_window(&self) -> (u32, u32) {
        let start = self
            .start_time
            .map(|t| t.hour() * 60 + t.minute())
            .unwrap_or(0);
        let end = self
            .end_time
            .map(|t| t.hour() * 60 + t.minute())
            .unwrap_or(MINUTES_PER_DAY);
        (start, end)
    }

    /// Whether the rule is in effect on the given local date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.effective_to {
            if date > to {
                return false;
            }
        }
        true
    }
}
