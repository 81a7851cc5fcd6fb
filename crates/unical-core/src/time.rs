//! Time ranges for event queries.
//!
//! All timestamps crossing the contract boundary are epoch-millisecond
//! integers; [`TimeRange`] wraps a `[start, end]` pair of them and provides
//! chrono conversions for the recurrence math that needs calendar-aware
//! stepping.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An inclusive query window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Window start, epoch milliseconds.
    pub start: i64,
    /// Window end, epoch milliseconds.
    pub end: i64,
}

impl TimeRange {
    /// Creates a new range. `end` may not precede `start`.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Returns true if the range is well-formed (`start <= end`).
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Returns true if the instant falls inside the range (inclusive).
    pub fn contains(&self, instant: i64) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Returns true if `[start, end]` of another interval overlaps this range.
    ///
    /// An interval with no end is treated as a point at its start.
    pub fn overlaps(&self, start: i64, end: Option<i64>) -> bool {
        let end = end.unwrap_or(start);
        start <= self.end && end >= self.start
    }
}

/// Converts an epoch-millisecond timestamp to a UTC datetime.
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn from_epoch_ms(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

/// Converts a UTC datetime back to epoch milliseconds.
pub fn to_epoch_ms(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let range = TimeRange::new(100, 200);
        assert!(range.contains(100));
        assert!(range.contains(200));
        assert!(!range.contains(99));
        assert!(!range.contains(201));
    }

    #[test]
    fn overlap_with_open_end() {
        let range = TimeRange::new(100, 200);
        assert!(range.overlaps(150, None));
        assert!(!range.overlaps(250, None));
        assert!(range.overlaps(50, Some(100)));
        assert!(!range.overlaps(10, Some(99)));
    }

    #[test]
    fn epoch_roundtrip() {
        let ms = 1_700_000_000_000;
        let dt = from_epoch_ms(ms).unwrap();
        assert_eq!(to_epoch_ms(dt), ms);
    }

    #[test]
    fn invalid_range_detected() {
        assert!(!TimeRange::new(200, 100).is_valid());
        assert!(TimeRange::new(100, 100).is_valid());
    }
}
