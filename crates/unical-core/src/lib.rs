//! Core types: entities, recurrence rules, permissions, time ranges

pub mod entity;
pub mod params;
pub mod permission;
pub mod recurrence;
pub mod time;
pub mod tracing;

pub use entity::{
    Calendar, CalendarEvent, CalendarSource, EventOccurrence, Reminder, ReminderList, SourceKind,
};
pub use params::{
    CalendarChooserOptions, CalendarCreateParams, ChooserDisplayStyle, ChooserSelectionStyle,
    EventCreateParams, EventSpan, EventUpdate, PromptResult, ReminderCreateParams, ReminderUpdate,
};
pub use permission::{
    CalendarPermissionStatus, PermissionAlias, PermissionSnapshot, PermissionStatus,
    RemindersPermissionStatus,
};
pub use recurrence::{Frequency, RecurrenceEnd, RecurrenceError, RecurrenceRule};
pub use time::TimeRange;
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
