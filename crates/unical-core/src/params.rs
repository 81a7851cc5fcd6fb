//! Operation parameter and result shapes.
//!
//! Create parameters carry the full field set an entity supports; update
//! parameters are partial — only fields present in the update are changed,
//! absent fields retain their prior values.

use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceRule;

/// Scope qualifier for a modification to a recurring entity.
///
/// Only meaningful when the target has a recurrence rule. When omitted on a
/// recurring target, the default is [`ThisEvent`]: a whole series is never
/// silently rewritten.
///
/// [`ThisEvent`]: EventSpan::ThisEvent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSpan {
    /// Detach and modify only the targeted occurrence.
    #[default]
    ThisEvent,
    /// Rewrite the rule from the targeted occurrence forward.
    ThisAndFutureEvents,
}

/// Outcome of a native prompt UI as reported by the bridge.
///
/// Cancellation is a successful result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptResult {
    /// The user completed the native UI.
    Completed,
    /// The user dismissed the native UI without completing it.
    Cancelled,
}

impl PromptResult {
    /// Returns true if the user completed the prompt.
    pub fn completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Parameters for creating a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCreateParams {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CalendarCreateParams {
    /// Creates parameters with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: None,
        }
    }

    /// Builder method to set the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Parameters for creating an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreateParams {
    pub title: String,
    /// Target calendar; the bridge's default calendar when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
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

impl EventCreateParams {
    /// Creates parameters with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder method to target a specific calendar.
    pub fn with_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    /// Builder method to set start and end, epoch milliseconds.
    pub fn with_dates(mut self, start: i64, end: i64) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Builder method to attach a recurrence rule.
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    /// Builder method to set alert offsets in minutes.
    pub fn with_alert_offsets(mut self, offsets: Vec<i64>) -> Self {
        self.alert_offsets = offsets;
        self
    }
}

/// Partial update for an event. Absent fields keep their prior values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_offsets: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl EventUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to change the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to change the start date.
    pub fn with_start_date(mut self, start: i64) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Builder method to replace the recurrence rule.
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }
}

/// Parameters for creating a reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderCreateParams {
    pub title: String,
    /// Target reminder list; the bridge's default list when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
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
    /// 0 means no priority; 1 is highest, 9 lowest.
    #[serde(default)]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alert_offsets: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl ReminderCreateParams {
    /// Creates parameters with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder method to target a specific reminder list.
    pub fn with_list(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = Some(list_id.into());
        self
    }

    /// Builder method to set the due date, epoch milliseconds.
    pub fn with_due_date(mut self, due: i64) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Builder method to set the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Builder method to attach a recurrence rule.
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }
}

/// Partial update for a reminder. Absent fields keep their prior values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_offsets: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl ReminderUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to change the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to mark the reminder completed or not.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.is_completed = Some(completed);
        self
    }
}

/// How many calendars the native chooser lets the user pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChooserSelectionStyle {
    #[default]
    Single,
    Multiple,
}

/// Which calendars the native chooser displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChooserDisplayStyle {
    #[default]
    AllCalendars,
    WritableCalendars,
}

/// Options for the native calendar chooser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarChooserOptions {
    pub selection_style: ChooserSelectionStyle,
    pub display_style: ChooserDisplayStyle,
}

impl CalendarChooserOptions {
    /// Creates chooser options.
    pub fn new(selection_style: ChooserSelectionStyle, display_style: ChooserDisplayStyle) -> Self {
        Self {
            selection_style,
            display_style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Frequency, RecurrenceRule};

    #[test]
    fn span_defaults_to_single_instance() {
        assert_eq!(EventSpan::default(), EventSpan::ThisEvent);
        assert_eq!(
            serde_json::to_string(&EventSpan::ThisAndFutureEvents).unwrap(),
            "\"THIS_AND_FUTURE_EVENTS\""
        );
    }

    #[test]
    fn prompt_result_completed() {
        assert!(PromptResult::Completed.completed());
        assert!(!PromptResult::Cancelled.completed());
    }

    #[test]
    fn event_create_builder() {
        let params = EventCreateParams::new("Standup")
            .with_calendar("cal-1")
            .with_dates(100, 200)
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 1));
        assert_eq!(params.title, "Standup");
        assert_eq!(params.calendar_id.as_deref(), Some("cal-1"));
        assert_eq!(params.start_date, Some(100));
        assert!(params.recurrence.is_some());
    }

    #[test]
    fn update_serde_omits_absent_fields() {
        let update = EventUpdate::new().with_title("X");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "X" }));
    }

    #[test]
    fn chooser_styles_wire_names() {
        let options = CalendarChooserOptions::new(
            ChooserSelectionStyle::Multiple,
            ChooserDisplayStyle::WritableCalendars,
        );
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json["selectionStyle"], "MULTIPLE");
        assert_eq!(json["displayStyle"], "WRITABLE_CALENDARS");
    }
}
