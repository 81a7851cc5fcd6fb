//! Entity shapes owned by the native calendar store.
//!
//! Every id in this module is an opaque string assigned by the native store;
//! equality is the only permitted comparison. This layer holds no entity state
//! beyond the lifetime of a single call.

use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceRule;

/// A calendar in the native store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    /// Opaque identifier assigned by the native store at creation.
    pub id: String,
    pub title: String,
    /// Display color, if the store reports one (e.g. `#FF4400`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Id of the source/account backing this calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Calendar {
    /// Creates a calendar with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: None,
            source: None,
        }
    }

    /// Builder method to set the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder method to set the backing source id.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// The kind of account backing a calendar or reminders source.
///
/// Closed union over the source types native stores report, with an explicit
/// catch-all instead of silent coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Local,
    CalDav,
    Exchange,
    Subscribed,
    Birthdays,
    #[default]
    Other,
}

/// An account/source that calendars or reminder lists belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSource {
    pub id: String,
    pub title: String,
    pub kind: SourceKind,
}

impl CalendarSource {
    /// Creates a source with the given id, title, and kind.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
        }
    }
}

/// An event series as stored by the native calendar store.
///
/// A recurring event is represented once, by its series; concrete occurrences
/// are expanded at query time into [`EventOccurrence`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Start, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    /// End, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub is_all_day: bool,
    /// Alert offsets in minutes relative to the start date.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alert_offsets: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl CalendarEvent {
    /// Creates a minimal event in the given calendar.
    pub fn new(
        id: impl Into<String>,
        calendar_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            calendar_id: calendar_id.into(),
            title: title.into(),
            notes: None,
            url: None,
            location: None,
            start_date: None,
            end_date: None,
            is_all_day: false,
            alert_offsets: Vec::new(),
            recurrence: None,
        }
    }

    /// Returns true if this event repeats.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// One concrete instance of an event inside a query window.
///
/// The occurrence id is derived from `(series_id, occurrence_start)` and is
/// distinct from the series id used to modify or delete the series itself.
/// A non-recurring event yields a single occurrence whose id equals its
/// series id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOccurrence {
    pub id: String,
    pub series_id: String,
    pub calendar_id: String,
    pub title: String,
    /// Occurrence start, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    /// Occurrence end, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub is_all_day: bool,
}

impl EventOccurrence {
    /// Derives the occurrence id for a recurring series instance.
    pub fn derive_id(series_id: &str, occurrence_start: i64) -> String {
        format!("{series_id}@{occurrence_start}")
    }
}

/// A list that reminders belong to (the reminders-side analog of a calendar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderList {
    pub id: String,
    pub title: String,
}

impl ReminderList {
    /// Creates a reminder list with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A reminder in the native reminders store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    /// The reminder list this reminder belongs to.
    pub calendar_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    /// Due date, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub is_all_day: bool,
    /// 0 means no priority; 1 is highest, 9 lowest (native convention).
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alert_offsets: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl Reminder {
    /// Creates a minimal reminder in the given list.
    pub fn new(
        id: impl Into<String>,
        list_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            calendar_id: list_id.into(),
            title: title.into(),
            notes: None,
            url: None,
            location: None,
            start_date: None,
            due_date: None,
            is_all_day: false,
            priority: 0,
            is_completed: false,
            alert_offsets: Vec::new(),
            recurrence: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_builder() {
        let cal = Calendar::new("cal-1", "Work")
            .with_color("#FF4400")
            .with_source("src-1");
        assert_eq!(cal.id, "cal-1");
        assert_eq!(cal.color.as_deref(), Some("#FF4400"));
        assert_eq!(cal.source.as_deref(), Some("src-1"));
    }

    #[test]
    fn occurrence_id_derivation() {
        let id = EventOccurrence::derive_id("evt-7", 1_700_000_000_000);
        assert_eq!(id, "evt-7@1700000000000");
        assert_ne!(id, EventOccurrence::derive_id("evt-7", 1_700_000_000_001));
    }

    #[test]
    fn event_serde_omits_empty_fields() {
        let event = CalendarEvent::new("e", "c", "Standup");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["calendarId"], "c");
        assert!(json.get("notes").is_none());
        assert!(json.get("alertOffsets").is_none());
        assert_eq!(json["isAllDay"], false);
    }

    #[test]
    fn reminder_defaults() {
        let reminder = Reminder::new("r-1", "list-1", "Buy milk");
        assert_eq!(reminder.priority, 0);
        assert!(!reminder.is_completed);
        assert!(reminder.due_date.is_none());
    }

    #[test]
    fn source_kind_fallback() {
        assert_eq!(SourceKind::default(), SourceKind::Other);
        assert_eq!(
            serde_json::to_string(&SourceKind::CalDav).unwrap(),
            "\"calDav\""
        );
    }
}
