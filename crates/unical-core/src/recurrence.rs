//! Recurrence rules shared by events and reminders.
//!
//! A [`RecurrenceRule`] is a value attached to exactly one entity; it has no
//! identity or lifecycle of its own. Validation happens here, before any
//! create/modify request reaches a native bridge, because native stores tend
//! to report malformed rules silently or inconsistently.
//!
//! [`occurrence_starts`] expands a rule into concrete occurrence start times
//! inside a query window. Keeping expansion in this layer (rather than in each
//! bridge) is what makes recurrence semantics identical across platforms.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::time::{from_epoch_ms, to_epoch_ms, TimeRange};

/// Hard cap on expansion steps so a degenerate rule cannot spin.
const MAX_EXPANSION_STEPS: u32 = 10_000;

/// How often a recurring entity repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// All frequencies, used as the default supported set.
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// The wire name of this frequency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Advances `start` by `steps` periods of this frequency.
    ///
    /// Month and year stepping uses calendar arithmetic (chrono clamps the
    /// day-of-month, so Jan 31 + 1 month lands on the last day of February).
    /// Returns `None` when the result is outside chrono's range.
    fn advance(&self, start: DateTime<Utc>, steps: u64) -> Option<DateTime<Utc>> {
        match self {
            Self::Daily => start.checked_add_signed(Duration::days(i64::try_from(steps).ok()?)),
            Self::Weekly => start.checked_add_signed(Duration::weeks(i64::try_from(steps).ok()?)),
            Self::Monthly => start.checked_add_months(Months::new(u32::try_from(steps).ok()?)),
            Self::Yearly => {
                start.checked_add_months(Months::new(u32::try_from(steps.checked_mul(12)?).ok()?))
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When a recurring series stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RecurrenceEnd {
    /// Last permitted occurrence start, epoch milliseconds.
    Until(i64),
    /// Total number of occurrences, including the first.
    Count(u32),
}

/// A recurrence rule attached to an event or reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Number of periods between occurrences; must be at least 1.
    pub interval: u32,
    /// End condition; `None` means the series repeats indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<RecurrenceEnd>,
}

impl RecurrenceRule {
    /// Creates a rule repeating every `interval` periods with no end.
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            end: None,
        }
    }

    /// Builder method to end the series at a timestamp.
    pub fn until(mut self, end: i64) -> Self {
        self.end = Some(RecurrenceEnd::Until(end));
        self
    }

    /// Builder method to end the series after a number of occurrences.
    pub fn count(mut self, count: u32) -> Self {
        self.end = Some(RecurrenceEnd::Count(count));
        self
    }

    /// Validates the rule against the owning entity's start date and the
    /// frequencies the target bridge supports for that entity kind.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceError`] when the interval is zero, the end
    /// timestamp precedes the entity start, or the frequency is not in
    /// `supported`.
    pub fn validate(
        &self,
        start_date: Option<i64>,
        supported: &[Frequency],
    ) -> Result<(), RecurrenceError> {
        if self.interval == 0 {
            return Err(RecurrenceError::IntervalZero);
        }
        if !supported.contains(&self.frequency) {
            return Err(RecurrenceError::UnsupportedFrequency {
                frequency: self.frequency,
            });
        }
        if let (Some(start), Some(RecurrenceEnd::Until(end))) = (start_date, self.end)
            && end < start
        {
            return Err(RecurrenceError::EndBeforeStart { start, end });
        }
        Ok(())
    }
}

/// Why a recurrence rule was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum RecurrenceError {
    /// The interval must be a positive integer.
    #[error("recurrence interval must be at least 1")]
    IntervalZero,

    /// The end timestamp precedes the entity's start date.
    #[error("recurrence end {end} precedes entity start {start}")]
    EndBeforeStart { start: i64, end: i64 },

    /// The bridge does not support this frequency for this entity kind.
    #[error("frequency {frequency} is not supported for this entity kind")]
    UnsupportedFrequency { frequency: Frequency },
}

/// Expands a rule into concrete occurrence start times within `range`.
///
/// Occurrences are computed from `series_start`, stepping `interval` periods
/// at a time; each step is derived from the series start rather than the
/// previous occurrence so month-end clamping does not drift. The result is
/// sorted ascending and bounded by the rule's end condition, the window end,
/// and [`MAX_EXPANSION_STEPS`].
pub fn occurrence_starts(rule: &RecurrenceRule, series_start: i64, range: TimeRange) -> Vec<i64> {
    if rule.interval == 0 || !range.is_valid() {
        return Vec::new();
    }
    let Some(start_dt) = from_epoch_ms(series_start) else {
        return Vec::new();
    };

    let max_count = match rule.end {
        Some(RecurrenceEnd::Count(n)) => n,
        _ => u32::MAX,
    };
    let until = match rule.end {
        Some(RecurrenceEnd::Until(t)) => t,
        _ => i64::MAX,
    };

    let mut starts = Vec::new();
    for step in 0..MAX_EXPANSION_STEPS {
        if step >= max_count {
            break;
        }
        let periods = u64::from(rule.interval) * u64::from(step);
        let Some(occurrence) = rule.frequency.advance(start_dt, periods) else {
            break;
        };
        let occurrence_ms = to_epoch_ms(occurrence);
        if occurrence_ms > until || occurrence_ms > range.end {
            break;
        }
        if occurrence_ms >= range.start {
            starts.push(occurrence_ms);
        }
    }
    starts
}
