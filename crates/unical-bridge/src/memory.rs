//! In-memory reference bridge.
//!
//! [`InMemoryBridge`] is a complete [`CalendarBridge`] over process-local
//! state. It serves two purposes: a reference implementation of the contract
//! for bridge authors, and the test double the dispatch layer is exercised
//! against. Permission behavior is scriptable — initial statuses, per-alias
//! prompt results, optional prompt latency — and every native prompt is
//! counted so tests can assert coalescing.
//!
//! The bridge is deliberately dumb: it never dedupes prompts, never expands
//! recurrences, and never applies permission policy. That is the dispatch
//! layer's job.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use unical_core::{
    Calendar, CalendarChooserOptions, CalendarCreateParams, CalendarEvent, CalendarSource,
    ChooserSelectionStyle, EventCreateParams, EventSpan, EventUpdate, PermissionAlias,
    PermissionSnapshot, PermissionStatus, PromptResult, Reminder, ReminderCreateParams,
    ReminderList, ReminderUpdate, SourceKind, TimeRange,
};

use crate::bridge::{BoxFuture, CalendarBridge, CapabilityTable};
use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Default)]
struct MemoryState {
    statuses: PermissionSnapshot,
    prompt_results: BTreeMap<PermissionAlias, PermissionStatus>,
    prompt_counts: BTreeMap<PermissionAlias, u32>,
    prompt_log: Vec<PermissionAlias>,
    next_id: u64,
    calendars: BTreeMap<String, Calendar>,
    default_calendar: Option<String>,
    calendar_sources: Vec<CalendarSource>,
    events: BTreeMap<String, CalendarEvent>,
    reminder_lists: BTreeMap<String, ReminderList>,
    default_list: Option<String>,
    reminder_sources: Vec<CalendarSource>,
    reminders: BTreeMap<String, Reminder>,
    /// Scripted outcomes for the event prompt UIs; empty means `Completed`.
    prompt_script: VecDeque<PromptResult>,
    /// Scripted chooser selections (calendar ids); empty means cancelled.
    chooser_script: VecDeque<Vec<String>>,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// An in-process calendar store implementing [`CalendarBridge`].
pub struct InMemoryBridge {
    name: String,
    capabilities: CapabilityTable,
    prompt_delay: Option<Duration>,
    state: Mutex<MemoryState>,
}

impl Default for InMemoryBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBridge {
    /// Creates a bridge seeded like a fresh device store: one local source,
    /// one default calendar, one default reminder list, every alias granted.
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        for alias in PermissionAlias::ALL {
            state.statuses.set(alias, PermissionStatus::Granted);
        }
        state
            .calendar_sources
            .push(CalendarSource::new("src-local", "On Device", SourceKind::Local));
        state
            .reminder_sources
            .push(CalendarSource::new("src-local", "On Device", SourceKind::Local));
        let home = Calendar::new("cal-1", "Home").with_source("src-local");
        state.default_calendar = Some(home.id.clone());
        state.calendars.insert(home.id.clone(), home);
        let inbox = ReminderList::new("list-1", "Reminders");
        state.default_list = Some(inbox.id.clone());
        state.reminder_lists.insert(inbox.id.clone(), inbox);
        state.next_id = 1;

        Self {
            name: "memory".to_string(),
            capabilities: CapabilityTable::new(),
            prompt_delay: None,
            state: Mutex::new(state),
        }
    }

    /// Builder method to replace the capability table.
    pub fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Builder method to set the initial status of one alias.
    pub fn with_status(self, alias: PermissionAlias, status: PermissionStatus) -> Self {
        self.state().statuses.set(alias, status);
        self
    }

    /// Builder method to set the status a prompt for `alias` resolves to.
    pub fn with_prompt_result(self, alias: PermissionAlias, status: PermissionStatus) -> Self {
        self.state().prompt_results.insert(alias, status);
        self
    }

    /// Builder method to add latency to every native prompt, so tests can
    /// overlap concurrent requests deterministically.
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = Some(delay);
        self
    }

    /// Queues an outcome for the next event prompt UI.
    pub fn script_prompt(&self, outcome: PromptResult) {
        self.state().prompt_script.push_back(outcome);
    }

    /// Queues a selection for the next calendar chooser invocation.
    pub fn script_chooser_selection(&self, calendar_ids: Vec<String>) {
        self.state().chooser_script.push_back(calendar_ids);
    }

    /// Number of native prompts shown for an alias so far.
    pub fn prompt_count(&self, alias: PermissionAlias) -> u32 {
        self.state().prompt_counts.get(&alias).copied().unwrap_or(0)
    }

    /// Every native prompt shown so far, in the order it was shown.
    pub fn prompt_log(&self) -> Vec<PermissionAlias> {
        self.state().prompt_log.clone()
    }

    /// Snapshot accessor for a stored event, by series id.
    pub fn event(&self, id: &str) -> Option<CalendarEvent> {
        self.state().events.get(id).cloned()
    }

    /// Snapshot accessor for a stored reminder.
    pub fn reminder(&self, id: &str) -> Option<Reminder> {
        self.state().reminders.get(id).cloned()
    }

    /// Snapshot accessor for a stored calendar.
    pub fn calendar(&self, id: &str) -> Option<Calendar> {
        self.state().calendars.get(id).cloned()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn err(&self, error: BridgeError) -> BridgeError {
        error.with_bridge(&self.name)
    }
}

fn apply_event_update(event: &mut CalendarEvent, update: EventUpdate) {
    if let Some(title) = update.title {
        event.title = title;
    }
    if let Some(calendar_id) = update.calendar_id {
        event.calendar_id = calendar_id;
    }
    if let Some(notes) = update.notes {
        event.notes = Some(notes);
    }
    if let Some(url) = update.url {
        event.url = Some(url);
    }
    if let Some(location) = update.location {
        event.location = Some(location);
    }
    if let Some(start) = update.start_date {
        event.start_date = Some(start);
    }
    if let Some(end) = update.end_date {
        event.end_date = Some(end);
    }
    if let Some(all_day) = update.is_all_day {
        event.is_all_day = all_day;
    }
    if let Some(offsets) = update.alert_offsets {
        event.alert_offsets = offsets;
    }
    if let Some(rule) = update.recurrence {
        event.recurrence = Some(rule);
    }
}

fn apply_reminder_update(reminder: &mut Reminder, update: ReminderUpdate) {
    if let Some(title) = update.title {
        reminder.title = title;
    }
    if let Some(list_id) = update.list_id {
        reminder.calendar_id = list_id;
    }
    if let Some(notes) = update.notes {
        reminder.notes = Some(notes);
    }
    if let Some(url) = update.url {
        reminder.url = Some(url);
    }
    if let Some(location) = update.location {
        reminder.location = Some(location);
    }
    if let Some(start) = update.start_date {
        reminder.start_date = Some(start);
    }
    if let Some(due) = update.due_date {
        reminder.due_date = Some(due);
    }
    if let Some(all_day) = update.is_all_day {
        reminder.is_all_day = all_day;
    }
    if let Some(priority) = update.priority {
        reminder.priority = priority;
    }
    if let Some(completed) = update.is_completed {
        reminder.is_completed = completed;
    }
    if let Some(offsets) = update.alert_offsets {
        reminder.alert_offsets = offsets;
    }
    if let Some(rule) = update.recurrence {
        reminder.recurrence = Some(rule);
    }
}

impl InMemoryBridge {
    fn insert_event(
        state: &mut MemoryState,
        params: EventCreateParams,
    ) -> BridgeResult<String> {
        let calendar_id = match params.calendar_id {
            Some(id) => id,
            None => state
                .default_calendar
                .clone()
                .ok_or_else(|| BridgeError::not_found("store has no default calendar"))?,
        };
        if !state.calendars.contains_key(&calendar_id) {
            return Err(BridgeError::not_found(format!(
                "calendar {calendar_id} does not exist"
            )));
        }
        let id = state.next_id("evt");
        let title = if params.title.is_empty() {
            "New Event".to_string()
        } else {
            params.title
        };
        let event = CalendarEvent {
            id: id.clone(),
            calendar_id,
            title,
            notes: params.notes,
            url: params.url,
            location: params.location,
            start_date: params.start_date,
            end_date: params.end_date,
            is_all_day: params.is_all_day,
            alert_offsets: params.alert_offsets,
            recurrence: params.recurrence,
        };
        state.events.insert(id.clone(), event);
        Ok(id)
    }

    fn apply_modify_event(
        state: &mut MemoryState,
        id: &str,
        update: EventUpdate,
        span: EventSpan,
    ) -> BridgeResult<()> {
        let event = state
            .events
            .get_mut(id)
            .ok_or_else(|| BridgeError::not_found(format!("event {id} does not exist")))?;
        if span == EventSpan::ThisAndFutureEvents && event.recurrence.is_none() {
            return Err(BridgeError::invalid_input(
                "span THIS_AND_FUTURE_EVENTS requires a recurring event",
            ));
        }
        // The in-memory store applies single-instance edits to the series
        // record; occurrence detach fidelity is a native-store concern.
        apply_event_update(event, update);
        Ok(())
    }
}

impl CalendarBridge for InMemoryBridge {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn check_permission(
        &self,
        alias: PermissionAlias,
    ) -> BoxFuture<'_, BridgeResult<PermissionStatus>> {
        Box::pin(async move { Ok(self.state().statuses.get(alias)) })
    }

    fn request_permission(
        &self,
        alias: PermissionAlias,
    ) -> BoxFuture<'_, BridgeResult<PermissionStatus>> {
        Box::pin(async move {
            if let Some(delay) = self.prompt_delay {
                tokio::time::sleep(delay).await;
            }
            let mut state = self.state();
            *state.prompt_counts.entry(alias).or_insert(0) += 1;
            state.prompt_log.push(alias);
            let status = state
                .prompt_results
                .get(&alias)
                .copied()
                .unwrap_or(PermissionStatus::Granted);
            state.statuses.set(alias, status);
            tracing::debug!(alias = %alias, status = %status, "simulated permission prompt");
            Ok(status)
        })
    }

    fn list_calendars(&self) -> BoxFuture<'_, BridgeResult<Vec<Calendar>>> {
        Box::pin(async move { Ok(self.state().calendars.values().cloned().collect()) })
    }

    fn default_calendar(&self) -> BoxFuture<'_, BridgeResult<Option<Calendar>>> {
        Box::pin(async move {
            let state = self.state();
            Ok(state
                .default_calendar
                .as_ref()
                .and_then(|id| state.calendars.get(id))
                .cloned())
        })
    }

    fn calendar_sources(&self) -> BoxFuture<'_, BridgeResult<Vec<CalendarSource>>> {
        Box::pin(async move { Ok(self.state().calendar_sources.clone()) })
    }

    fn create_calendar(&self, params: CalendarCreateParams) -> BoxFuture<'_, BridgeResult<String>> {
        Box::pin(async move {
            let mut state = self.state();
            let id = state.next_id("cal");
            let mut calendar = Calendar::new(id.clone(), params.title).with_source("src-local");
            calendar.color = params.color;
            state.calendars.insert(id.clone(), calendar);
            Ok(id)
        })
    }

    fn delete_calendar(&self, id: String) -> BoxFuture<'_, BridgeResult<()>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.calendars.remove(&id).is_none() {
                return Err(self.err(BridgeError::not_found(format!(
                    "calendar {id} does not exist"
                ))));
            }
            state.events.retain(|_, event| event.calendar_id != id);
            if state.default_calendar.as_deref() == Some(id.as_str()) {
                state.default_calendar = state.calendars.keys().next().cloned();
            }
            Ok(())
        })
    }

    fn events_in_range(&self, range: TimeRange) -> BoxFuture<'_, BridgeResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            let state = self.state();
            let events = state
                .events
                .values()
                .filter(|event| match event.start_date {
                    // A recurring series intersects any window at or after its
                    // start; non-recurring events must overlap the window.
                    Some(start) if event.is_recurring() => start <= range.end,
                    Some(start) => range.overlaps(start, event.end_date),
                    None => false,
                })
                .cloned()
                .collect();
            Ok(events)
        })
    }

    fn create_event(&self, params: EventCreateParams) -> BoxFuture<'_, BridgeResult<String>> {
        Box::pin(async move {
            let mut state = self.state();
            Self::insert_event(&mut state, params).map_err(|e| self.err(e))
        })
    }

    fn create_event_with_prompt(
        &self,
        params: EventCreateParams,
    ) -> BoxFuture<'_, BridgeResult<PromptResult>> {
        Box::pin(async move {
            let mut state = self.state();
            let outcome = state
                .prompt_script
                .pop_front()
                .unwrap_or(PromptResult::Completed);
            if outcome.completed() {
                Self::insert_event(&mut state, params).map_err(|e| self.err(e))?;
            }
            Ok(outcome)
        })
    }

    fn modify_event(
        &self,
        id: String,
        update: EventUpdate,
        span: EventSpan,
    ) -> BoxFuture<'_, BridgeResult<()>> {
        Box::pin(async move {
            let mut state = self.state();
            Self::apply_modify_event(&mut state, &id, update, span).map_err(|e| self.err(e))
        })
    }

    fn modify_event_with_prompt(
        &self,
        id: String,
        update: EventUpdate,
        span: EventSpan,
    ) -> BoxFuture<'_, BridgeResult<PromptResult>> {
        Box::pin(async move {
            let mut state = self.state();
            let outcome = state
                .prompt_script
                .pop_front()
                .unwrap_or(PromptResult::Completed);
            if outcome.completed() {
                Self::apply_modify_event(&mut state, &id, update, span)
                    .map_err(|e| self.err(e))?;
            }
            Ok(outcome)
        })
    }

    fn delete_event(&self, id: String) -> BoxFuture<'_, BridgeResult<()>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.events.remove(&id).is_none() {
                return Err(self.err(BridgeError::not_found(format!(
                    "event {id} does not exist"
                ))));
            }
            Ok(())
        })
    }

    fn select_calendars_with_prompt(
        &self,
        options: CalendarChooserOptions,
    ) -> BoxFuture<'_, BridgeResult<Vec<Calendar>>> {
        Box::pin(async move {
            let mut state = self.state();
            let Some(chosen_ids) = state.chooser_script.pop_front() else {
                // No scripted choice: the user cancelled the chooser.
                return Ok(Vec::new());
            };
            let mut chosen: Vec<Calendar> = chosen_ids
                .iter()
                .filter_map(|id| state.calendars.get(id))
                .cloned()
                .collect();
            if options.selection_style == ChooserSelectionStyle::Single {
                chosen.truncate(1);
            }
            Ok(chosen)
        })
    }

    fn reminder_lists(&self) -> BoxFuture<'_, BridgeResult<Vec<ReminderList>>> {
        Box::pin(async move { Ok(self.state().reminder_lists.values().cloned().collect()) })
    }

    fn default_reminder_list(&self) -> BoxFuture<'_, BridgeResult<Option<ReminderList>>> {
        Box::pin(async move {
            let state = self.state();
            Ok(state
                .default_list
                .as_ref()
                .and_then(|id| state.reminder_lists.get(id))
                .cloned())
        })
    }

    fn reminder_sources(&self) -> BoxFuture<'_, BridgeResult<Vec<CalendarSource>>> {
        Box::pin(async move { Ok(self.state().reminder_sources.clone()) })
    }

    fn reminders_in_lists(
        &self,
        list_ids: Vec<String>,
    ) -> BoxFuture<'_, BridgeResult<Vec<Reminder>>> {
        Box::pin(async move {
            let state = self.state();
            let reminders = state
                .reminders
                .values()
                .filter(|reminder| {
                    list_ids.is_empty() || list_ids.iter().any(|id| *id == reminder.calendar_id)
                })
                .cloned()
                .collect();
            Ok(reminders)
        })
    }

    fn create_reminder(&self, params: ReminderCreateParams) -> BoxFuture<'_, BridgeResult<String>> {
        Box::pin(async move {
            let mut state = self.state();
            let list_id = match params.list_id {
                Some(id) => id,
                None => state.default_list.clone().ok_or_else(|| {
                    self.err(BridgeError::not_found("store has no default reminder list"))
                })?,
            };
            if !state.reminder_lists.contains_key(&list_id) {
                return Err(self.err(BridgeError::not_found(format!(
                    "reminder list {list_id} does not exist"
                ))));
            }
            let id = state.next_id("rem");
            let reminder = Reminder {
                id: id.clone(),
                calendar_id: list_id,
                title: params.title,
                notes: params.notes,
                url: params.url,
                location: params.location,
                start_date: params.start_date,
                due_date: params.due_date,
                is_all_day: params.is_all_day,
                priority: params.priority,
                is_completed: false,
                alert_offsets: params.alert_offsets,
                recurrence: params.recurrence,
            };
            state.reminders.insert(id.clone(), reminder);
            Ok(id)
        })
    }

    fn modify_reminder(
        &self,
        id: String,
        update: ReminderUpdate,
    ) -> BoxFuture<'_, BridgeResult<()>> {
        Box::pin(async move {
            let mut state = self.state();
            let reminder = state.reminders.get_mut(&id).ok_or_else(|| {
                self.err(BridgeError::not_found(format!(
                    "reminder {id} does not exist"
                )))
            })?;
            apply_reminder_update(reminder, update);
            Ok(())
        })
    }

    fn delete_reminder(&self, id: String) -> BoxFuture<'_, BridgeResult<()>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.reminders.remove(&id).is_none() {
                return Err(self.err(BridgeError::not_found(format!(
                    "reminder {id} does not exist"
                ))));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeErrorCode;

    #[tokio::test]
    async fn seeded_store_has_defaults() {
        let bridge = InMemoryBridge::new();
        let default = bridge.default_calendar().await.unwrap().unwrap();
        assert_eq!(default.title, "Home");
        let list = bridge.default_reminder_list().await.unwrap().unwrap();
        assert_eq!(list.title, "Reminders");
        assert_eq!(bridge.calendar_sources().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_event_defaults_to_default_calendar() {
        let bridge = InMemoryBridge::new();
        let id = bridge
            .create_event(EventCreateParams::new("Standup"))
            .await
            .unwrap();
        let event = bridge.event(&id).unwrap();
        assert_eq!(event.calendar_id, "cal-1");
    }

    #[tokio::test]
    async fn create_event_rejects_unknown_calendar() {
        let bridge = InMemoryBridge::new();
        let err = bridge
            .create_event(EventCreateParams::new("Standup").with_calendar("cal-999"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), BridgeErrorCode::NotFound);
    }

    #[tokio::test]
    async fn prompt_result_is_scripted_per_alias() {
        let bridge = InMemoryBridge::new()
            .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Prompt)
            .with_prompt_result(PermissionAlias::ReadCalendar, PermissionStatus::Denied);
        let status = bridge
            .request_permission(PermissionAlias::ReadCalendar)
            .await
            .unwrap();
        assert_eq!(status, PermissionStatus::Denied);
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 1);
        // the bridge records the new status
        let status = bridge
            .check_permission(PermissionAlias::ReadCalendar)
            .await
            .unwrap();
        assert_eq!(status, PermissionStatus::Denied);
    }

    #[tokio::test]
    async fn every_request_is_a_native_prompt() {
        // Prompt dedupe belongs to the dispatch layer; the bridge counts
        // each call as one prompt.
        let bridge = InMemoryBridge::new();
        bridge
            .request_permission(PermissionAlias::WriteReminders)
            .await
            .unwrap();
        bridge
            .request_permission(PermissionAlias::WriteReminders)
            .await
            .unwrap();
        assert_eq!(bridge.prompt_count(PermissionAlias::WriteReminders), 2);
    }

    #[tokio::test]
    async fn span_this_and_future_rejected_for_one_shot_event() {
        let bridge = InMemoryBridge::new();
        let id = bridge
            .create_event(EventCreateParams::new("One-shot"))
            .await
            .unwrap();
        let err = bridge
            .modify_event(
                id,
                EventUpdate::new().with_title("X"),
                EventSpan::ThisAndFutureEvents,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), BridgeErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn cancelled_prompt_creates_nothing() {
        let bridge = InMemoryBridge::new();
        bridge.script_prompt(PromptResult::Cancelled);
        let outcome = bridge
            .create_event_with_prompt(EventCreateParams::new("Lunch"))
            .await
            .unwrap();
        assert_eq!(outcome, PromptResult::Cancelled);
        let events = bridge
            .events_in_range(TimeRange::new(i64::MIN, i64::MAX))
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn chooser_respects_single_selection_style() {
        let bridge = InMemoryBridge::new();
        let extra = bridge
            .create_calendar(CalendarCreateParams::new("Work"))
            .await
            .unwrap();
        bridge.script_chooser_selection(vec!["cal-1".to_string(), extra.clone()]);
        let chosen = bridge
            .select_calendars_with_prompt(CalendarChooserOptions::default())
            .await
            .unwrap();
        assert_eq!(chosen.len(), 1);
        // unscripted chooser call resolves as a cancel
        let chosen = bridge
            .select_calendars_with_prompt(CalendarChooserOptions::default())
            .await
            .unwrap();
        assert!(chosen.is_empty());
    }

    #[tokio::test]
    async fn deleting_calendar_drops_its_events() {
        let bridge = InMemoryBridge::new();
        let cal = bridge
            .create_calendar(CalendarCreateParams::new("Work"))
            .await
            .unwrap();
        let evt = bridge
            .create_event(EventCreateParams::new("Standup").with_calendar(cal.clone()))
            .await
            .unwrap();
        bridge.delete_calendar(cal).await.unwrap();
        assert!(bridge.event(&evt).is_none());
    }

    #[tokio::test]
    async fn reminders_filter_by_list() {
        let bridge = InMemoryBridge::new();
        let groceries = {
            // reminder lists are only creatable through seeding in this
            // bridge; reuse the default list plus a second one via state
            let id = "list-groceries".to_string();
            bridge.state().reminder_lists.insert(
                id.clone(),
                ReminderList::new(id.clone(), "Groceries"),
            );
            id
        };
        bridge
            .create_reminder(ReminderCreateParams::new("Buy milk").with_list(groceries.clone()))
            .await
            .unwrap();
        bridge
            .create_reminder(ReminderCreateParams::new("File taxes"))
            .await
            .unwrap();

        let all = bridge.reminders_in_lists(Vec::new()).await.unwrap();
        assert_eq!(all.len(), 2);
        let filtered = bridge.reminders_in_lists(vec![groceries]).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Buy milk");
    }
}
