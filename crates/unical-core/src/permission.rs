//! Permission aliases, statuses, and aggregate snapshots.
//!
//! Native calendar stores gate access behind named capabilities. This module
//! defines the four aliases the layer knows about, the union of statuses a
//! native permission subsystem may report, and the aggregate shapes returned
//! by the check-all/request-all operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission capability gating calendar or reminder access.
///
/// The variant order is load-bearing: aggregate requests walk [`PermissionAlias::ALL`]
/// in declaration order, which encodes the required sequencing (read before
/// write, calendar before reminders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionAlias {
    /// Read access to the calendar store.
    ReadCalendar,
    /// Write access to the calendar store.
    WriteCalendar,
    /// Read access to the reminders store.
    ReadReminders,
    /// Write access to the reminders store.
    WriteReminders,
}

impl PermissionAlias {
    /// All aliases, in the fixed aggregate-request order.
    pub const ALL: [PermissionAlias; 4] = [
        PermissionAlias::ReadCalendar,
        PermissionAlias::WriteCalendar,
        PermissionAlias::ReadReminders,
        PermissionAlias::WriteReminders,
    ];

    /// The wire name of this alias (e.g. `readCalendar`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadCalendar => "readCalendar",
            Self::WriteCalendar => "writeCalendar",
            Self::ReadReminders => "readReminders",
            Self::WriteReminders => "writeReminders",
        }
    }

    /// Returns true if this alias gates the calendar store (vs. reminders).
    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::ReadCalendar | Self::WriteCalendar)
    }

    /// Returns true if this alias gates write access.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::WriteCalendar | Self::WriteReminders)
    }
}

impl fmt::Display for PermissionAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authorization state of a single permission alias.
///
/// This is the union of states any native permission subsystem may report.
/// Platforms that have no concept of a given alias report [`Unknown`]
/// rather than failing.
///
/// [`Unknown`]: PermissionStatus::Unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    /// Access has been granted by the user.
    Granted,
    /// Access has been denied by the user.
    Denied,
    /// The user has not been asked yet; a prompt is possible.
    Prompt,
    /// A prompt is possible but the platform wants a rationale shown first.
    PromptWithRationale,
    /// The platform does not report a state for this alias.
    #[default]
    Unknown,
}

impl PermissionStatus {
    /// The wire name of this status (e.g. `prompt-with-rationale`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
            Self::PromptWithRationale => "prompt-with-rationale",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true if access is granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns true if a native prompt could still change this status.
    pub fn is_promptable(&self) -> bool {
        matches!(self, Self::Prompt | Self::PromptWithRationale)
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate status for the calendar-store aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPermissionStatus {
    pub read_calendar: PermissionStatus,
    pub write_calendar: PermissionStatus,
}

/// Aggregate status for the reminders-store aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersPermissionStatus {
    pub read_reminders: PermissionStatus,
    pub write_reminders: PermissionStatus,
}

/// A point-in-time snapshot of all four aliases.
///
/// Snapshots are recomputed on every check/request call; they are never cached
/// across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSnapshot {
    pub read_calendar: PermissionStatus,
    pub write_calendar: PermissionStatus,
    pub read_reminders: PermissionStatus,
    pub write_reminders: PermissionStatus,
}

impl PermissionSnapshot {
    /// Returns the status recorded for the given alias.
    pub fn get(&self, alias: PermissionAlias) -> PermissionStatus {
        match alias {
            PermissionAlias::ReadCalendar => self.read_calendar,
            PermissionAlias::WriteCalendar => self.write_calendar,
            PermissionAlias::ReadReminders => self.read_reminders,
            PermissionAlias::WriteReminders => self.write_reminders,
        }
    }

    /// Records the status for the given alias.
    pub fn set(&mut self, alias: PermissionAlias, status: PermissionStatus) {
        match alias {
            PermissionAlias::ReadCalendar => self.read_calendar = status,
            PermissionAlias::WriteCalendar => self.write_calendar = status,
            PermissionAlias::ReadReminders => self.read_reminders = status,
            PermissionAlias::WriteReminders => self.write_reminders = status,
        }
    }

    /// Narrows the snapshot to the calendar aliases.
    pub fn calendar(&self) -> CalendarPermissionStatus {
        CalendarPermissionStatus {
            read_calendar: self.read_calendar,
            write_calendar: self.write_calendar,
        }
    }

    /// Narrows the snapshot to the reminders aliases.
    pub fn reminders(&self) -> RemindersPermissionStatus {
        RemindersPermissionStatus {
            read_reminders: self.read_reminders,
            write_reminders: self.write_reminders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_order_is_read_before_write_calendar_before_reminders() {
        assert_eq!(
            PermissionAlias::ALL,
            [
                PermissionAlias::ReadCalendar,
                PermissionAlias::WriteCalendar,
                PermissionAlias::ReadReminders,
                PermissionAlias::WriteReminders,
            ]
        );
    }

    #[test]
    fn alias_wire_names() {
        assert_eq!(PermissionAlias::ReadCalendar.as_str(), "readCalendar");
        assert_eq!(
            serde_json::to_string(&PermissionAlias::WriteReminders).unwrap(),
            "\"writeReminders\""
        );
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PermissionStatus::PromptWithRationale).unwrap(),
            "\"prompt-with-rationale\""
        );
        assert_eq!(
            serde_json::from_str::<PermissionStatus>("\"granted\"").unwrap(),
            PermissionStatus::Granted
        );
    }

    #[test]
    fn status_predicates() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(PermissionStatus::Prompt.is_promptable());
        assert!(PermissionStatus::PromptWithRationale.is_promptable());
        assert!(!PermissionStatus::Denied.is_promptable());
        assert_eq!(PermissionStatus::default(), PermissionStatus::Unknown);
    }

    #[test]
    fn snapshot_get_set_roundtrip() {
        let mut snapshot = PermissionSnapshot::default();
        snapshot.set(PermissionAlias::ReadReminders, PermissionStatus::Granted);
        assert_eq!(
            snapshot.get(PermissionAlias::ReadReminders),
            PermissionStatus::Granted
        );
        assert_eq!(
            snapshot.get(PermissionAlias::ReadCalendar),
            PermissionStatus::Unknown
        );
        assert_eq!(
            snapshot.reminders().read_reminders,
            PermissionStatus::Granted
        );
    }
}
