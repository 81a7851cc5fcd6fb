//! The unified contract surface and its dispatch pipeline.
//!
//! [`CalendarClient`] is what callers hold: one object exposing every
//! calendar, event, reminder, and permission operation, routed to whichever
//! [`CalendarBridge`] the host platform provides. Each call runs the same
//! pipeline — validate, permission pre-check, dispatch, normalize — and
//! settles exactly once, with no automatic retries. Calls for unrelated
//! entities proceed independently; only same-alias permission prompts are
//! serialized (through the [`PermissionBroker`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use unical_bridge::{CalendarBridge, EntityKind};
use unical_core::{
    recurrence, Calendar, CalendarChooserOptions, CalendarCreateParams, CalendarPermissionStatus,
    CalendarSource, EventCreateParams, EventOccurrence, EventSpan, EventUpdate, PermissionAlias,
    PermissionSnapshot, PermissionStatus, Reminder, ReminderCreateParams, ReminderList,
    ReminderUpdate, RemindersPermissionStatus, TimeRange,
};

use crate::error::{CalendarError, CalendarResult};
use crate::permissions::PermissionBroker;

/// Per-id result of a batched delete.
///
/// Deletion is attempted independently per id; one failure never aborts the
/// others, so the batched call reports an outcome per id instead of an
/// all-or-nothing boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DeleteOutcome {
    /// The entity was deleted.
    Deleted,
    /// The delete failed for this id.
    Failed { error: CalendarError },
}

impl DeleteOutcome {
    /// Returns true if the entity was deleted.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// The platform-agnostic calendar/reminders access client.
pub struct CalendarClient {
    bridge: Arc<dyn CalendarBridge>,
    permissions: PermissionBroker,
}

impl CalendarClient {
    /// Creates a client over the given bridge.
    pub fn new(bridge: Arc<dyn CalendarBridge>) -> Self {
        let permissions = PermissionBroker::new(bridge.clone());
        Self {
            bridge,
            permissions,
        }
    }

    /// Returns the name of the bridge this client dispatches to.
    pub fn bridge_name(&self) -> &str {
        self.bridge.name()
    }

    /// Returns the permission broker backing this client.
    pub fn permissions(&self) -> &PermissionBroker {
        &self.permissions
    }

    // === Permission contract ===

    /// Reads the current status of one alias. Never prompts.
    pub async fn check_permission(&self, alias: PermissionAlias) -> PermissionStatus {
        self.permissions.check(alias).await
    }

    /// Checks all four aliases in one call.
    pub async fn check_all_permissions(&self) -> PermissionSnapshot {
        self.permissions.check_all().await
    }

    /// Requests one alias, prompting at most once (coalesced).
    pub async fn request_permission(
        &self,
        alias: PermissionAlias,
    ) -> CalendarResult<PermissionStatus> {
        self.permissions.request(alias).await
    }

    /// Requests every alias lacking a grant, in the fixed order.
    pub async fn request_all_permissions(&self) -> PermissionSnapshot {
        self.permissions.request_all().await
    }

    /// Escalation: read access to calendars only.
    pub async fn request_read_only_calendar_access(&self) -> CalendarPermissionStatus {
        self.permissions.request_read_only_calendar_access().await
    }

    /// Escalation: write access to calendars only.
    pub async fn request_write_only_calendar_access(&self) -> CalendarPermissionStatus {
        self.permissions.request_write_only_calendar_access().await
    }

    /// Escalation: full calendar access, read first.
    pub async fn request_full_calendar_access(&self) -> CalendarPermissionStatus {
        self.permissions.request_full_calendar_access().await
    }

    /// Escalation: full reminders access, read first.
    pub async fn request_full_reminders_access(&self) -> RemindersPermissionStatus {
        self.permissions.request_full_reminders_access().await
    }

    // === Calendars ===

    /// Lists all calendars. Snapshot, not a live view.
    pub async fn list_calendars(&self) -> CalendarResult<Vec<Calendar>> {
        self.ensure_granted(PermissionAlias::ReadCalendar).await?;
        self.dispatch(self.bridge.list_calendars(), PermissionAlias::ReadCalendar)
            .await
    }

    /// Returns the store's default calendar, if any.
    pub async fn get_default_calendar(&self) -> CalendarResult<Option<Calendar>> {
        self.ensure_granted(PermissionAlias::ReadCalendar).await?;
        self.dispatch(self.bridge.default_calendar(), PermissionAlias::ReadCalendar)
            .await
    }

    /// Lists the sources/accounts backing the calendar store.
    pub async fn fetch_all_calendar_sources(&self) -> CalendarResult<Vec<CalendarSource>> {
        self.ensure_granted(PermissionAlias::ReadCalendar).await?;
        self.dispatch(self.bridge.calendar_sources(), PermissionAlias::ReadCalendar)
            .await
    }

    /// Creates a calendar and returns its store-assigned id.
    pub async fn create_calendar(&self, params: CalendarCreateParams) -> CalendarResult<String> {
        require_non_empty(&params.title, "title")?;
        self.ensure_granted(PermissionAlias::WriteCalendar).await?;
        debug!(title = %params.title, "creating calendar");
        self.dispatch(
            self.bridge.create_calendar(params),
            PermissionAlias::WriteCalendar,
        )
        .await
    }

    /// Deletes a calendar by id.
    pub async fn delete_calendar(&self, id: impl Into<String>) -> CalendarResult<()> {
        let id = id.into();
        require_non_empty(&id, "id")?;
        self.ensure_granted(PermissionAlias::WriteCalendar).await?;
        self.dispatch(
            self.bridge.delete_calendar(id),
            PermissionAlias::WriteCalendar,
        )
        .await
    }

    /// Presents the native calendar chooser and returns the chosen subset.
    ///
    /// Cancellation yields an empty selection — a success, not an error.
    /// Bypasses the permission pre-check when the bridge grants
    /// `readCalendar` implicitly per call.
    pub async fn select_calendars_with_prompt(
        &self,
        options: CalendarChooserOptions,
    ) -> CalendarResult<Vec<Calendar>> {
        self.ensure_prompt_access(PermissionAlias::ReadCalendar)
            .await?;
        self.dispatch(
            self.bridge.select_calendars_with_prompt(options),
            PermissionAlias::ReadCalendar,
        )
        .await
    }

    // === Events ===

    /// Creates an event and returns its store-assigned id.
    pub async fn create_event(&self, params: EventCreateParams) -> CalendarResult<String> {
        self.validate_event_create(&params)?;
        self.ensure_granted(PermissionAlias::WriteCalendar).await?;
        debug!(title = %params.title, recurring = params.recurrence.is_some(), "creating event");
        self.dispatch(
            self.bridge.create_event(params),
            PermissionAlias::WriteCalendar,
        )
        .await
    }

    /// Opens the native event-creation UI pre-filled with `params`.
    ///
    /// Prefill fields are validated like a programmatic create before the UI
    /// opens. Resolves `Ok(true)` when the user saved the event and
    /// `Ok(false)` when they cancelled — cancellation is a successful result.
    /// Bypasses the permission pre-check when the bridge grants
    /// `writeCalendar` implicitly per call.
    pub async fn create_event_with_prompt(
        &self,
        params: EventCreateParams,
    ) -> CalendarResult<bool> {
        self.validate_event_create(&params)?;
        self.ensure_prompt_access(PermissionAlias::WriteCalendar)
            .await?;
        let outcome = self
            .dispatch(
                self.bridge.create_event_with_prompt(params),
                PermissionAlias::WriteCalendar,
            )
            .await?;
        Ok(outcome.completed())
    }

    /// Applies a partial update to an event.
    ///
    /// Fields absent from `update` keep their prior values. When the target
    /// is recurring and `span` is omitted, only the targeted occurrence is
    /// touched ([`EventSpan::ThisEvent`]); the series is never rewritten
    /// silently.
    pub async fn modify_event(
        &self,
        id: impl Into<String>,
        update: EventUpdate,
        span: Option<EventSpan>,
    ) -> CalendarResult<()> {
        let id = id.into();
        require_non_empty(&id, "id")?;
        if let Some(rule) = &update.recurrence {
            rule.validate(
                update.start_date,
                self.bridge
                    .capabilities()
                    .supported_frequencies(EntityKind::Event),
            )?;
        }
        self.ensure_granted(PermissionAlias::WriteCalendar).await?;
        let span = span.unwrap_or_default();
        debug!(id = %id, span = ?span, "modifying event");
        self.dispatch(
            self.bridge.modify_event(id, update, span),
            PermissionAlias::WriteCalendar,
        )
        .await
    }

    /// Opens the native event-editing UI for an event.
    ///
    /// Resolves `Ok(true)` when the user saved and `Ok(false)` on cancel.
    /// Bypasses the permission pre-check when the bridge grants
    /// `writeCalendar` implicitly per call.
    pub async fn modify_event_with_prompt(
        &self,
        id: impl Into<String>,
        update: EventUpdate,
        span: Option<EventSpan>,
    ) -> CalendarResult<bool> {
        let id = id.into();
        require_non_empty(&id, "id")?;
        if let Some(rule) = &update.recurrence {
            rule.validate(
                update.start_date,
                self.bridge
                    .capabilities()
                    .supported_frequencies(EntityKind::Event),
            )?;
        }
        self.ensure_prompt_access(PermissionAlias::WriteCalendar)
            .await?;
        let outcome = self
            .dispatch(
                self.bridge
                    .modify_event_with_prompt(id, update, span.unwrap_or_default()),
                PermissionAlias::WriteCalendar,
            )
            .await?;
        Ok(outcome.completed())
    }

    /// Deletes event series by id, independently per id.
    pub async fn delete_events_by_id(
        &self,
        ids: Vec<String>,
    ) -> CalendarResult<BTreeMap<String, DeleteOutcome>> {
        self.ensure_granted(PermissionAlias::WriteCalendar).await?;
        let mut outcomes = BTreeMap::new();
        for id in ids {
            let outcome = if id.trim().is_empty() {
                DeleteOutcome::Failed {
                    error: CalendarError::invalid_argument("id must not be empty"),
                }
            } else {
                match self.bridge.delete_event(id.clone()).await {
                    Ok(()) => DeleteOutcome::Deleted,
                    Err(error) => DeleteOutcome::Failed {
                        error: CalendarError::from_bridge(error, PermissionAlias::WriteCalendar),
                    },
                }
            };
            outcomes.insert(id, outcome);
        }
        Ok(outcomes)
    }

    /// Returns every concrete event occurrence inside `[start, end]`.
    ///
    /// Recurring series are expanded here, not in the bridge, so expansion
    /// semantics are identical on every platform. Occurrence ids are derived
    /// from `(series_id, occurrence_start)` and are distinct from the series
    /// id used to modify or delete the series.
    pub async fn list_events_in_range(
        &self,
        range: TimeRange,
    ) -> CalendarResult<Vec<EventOccurrence>> {
        if !range.is_valid() {
            return Err(CalendarError::invalid_argument(
                "range end must not precede range start",
            ));
        }
        self.ensure_granted(PermissionAlias::ReadCalendar).await?;
        let series = self
            .dispatch(
                self.bridge.events_in_range(range),
                PermissionAlias::ReadCalendar,
            )
            .await?;

        let mut occurrences = Vec::new();
        for event in series {
            match &event.recurrence {
                None => {
                    if let Some(start) = event.start_date
                        && !range.overlaps(start, event.end_date)
                    {
                        continue;
                    }
                    occurrences.push(EventOccurrence {
                        id: event.id.clone(),
                        series_id: event.id,
                        calendar_id: event.calendar_id,
                        title: event.title,
                        start_date: event.start_date,
                        end_date: event.end_date,
                        is_all_day: event.is_all_day,
                    });
                }
                Some(rule) => {
                    // A recurring series without a start date cannot be
                    // expanded into occurrences.
                    let Some(series_start) = event.start_date else {
                        continue;
                    };
                    let duration = event
                        .end_date
                        .and_then(|end| end.checked_sub(series_start))
                        .filter(|d| *d >= 0);
                    for start in recurrence::occurrence_starts(rule, series_start, range) {
                        occurrences.push(EventOccurrence {
                            id: EventOccurrence::derive_id(&event.id, start),
                            series_id: event.id.clone(),
                            calendar_id: event.calendar_id.clone(),
                            title: event.title.clone(),
                            start_date: Some(start),
                            end_date: duration.map(|d| start + d),
                            is_all_day: event.is_all_day,
                        });
                    }
                }
            }
        }
        occurrences.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(occurrences)
    }

    // === Reminders ===

    /// Lists all reminder lists.
    pub async fn get_reminders_lists(&self) -> CalendarResult<Vec<ReminderList>> {
        self.ensure_granted(PermissionAlias::ReadReminders).await?;
        self.dispatch(self.bridge.reminder_lists(), PermissionAlias::ReadReminders)
            .await
    }

    /// Returns the store's default reminder list, if any.
    pub async fn get_default_reminders_list(&self) -> CalendarResult<Option<ReminderList>> {
        self.ensure_granted(PermissionAlias::ReadReminders).await?;
        self.dispatch(
            self.bridge.default_reminder_list(),
            PermissionAlias::ReadReminders,
        )
        .await
    }

    /// Lists the sources/accounts backing the reminders store.
    pub async fn fetch_all_reminders_sources(&self) -> CalendarResult<Vec<CalendarSource>> {
        self.ensure_granted(PermissionAlias::ReadReminders).await?;
        self.dispatch(
            self.bridge.reminder_sources(),
            PermissionAlias::ReadReminders,
        )
        .await
    }

    /// Returns reminders from the given lists; empty `list_ids` means all.
    pub async fn get_reminders_from_lists(
        &self,
        list_ids: Vec<String>,
    ) -> CalendarResult<Vec<Reminder>> {
        self.ensure_granted(PermissionAlias::ReadReminders).await?;
        self.dispatch(
            self.bridge.reminders_in_lists(list_ids),
            PermissionAlias::ReadReminders,
        )
        .await
    }

    /// Creates a reminder and returns its store-assigned id.
    pub async fn create_reminder(&self, params: ReminderCreateParams) -> CalendarResult<String> {
        require_non_empty(&params.title, "title")?;
        if let Some(rule) = &params.recurrence {
            rule.validate(
                params.start_date.or(params.due_date),
                self.bridge
                    .capabilities()
                    .supported_frequencies(EntityKind::Reminder),
            )?;
        }
        self.ensure_granted(PermissionAlias::WriteReminders).await?;
        debug!(title = %params.title, "creating reminder");
        self.dispatch(
            self.bridge.create_reminder(params),
            PermissionAlias::WriteReminders,
        )
        .await
    }

    /// Applies a partial update to a reminder.
    pub async fn modify_reminder(
        &self,
        id: impl Into<String>,
        update: ReminderUpdate,
    ) -> CalendarResult<()> {
        let id = id.into();
        require_non_empty(&id, "id")?;
        if let Some(rule) = &update.recurrence {
            rule.validate(
                update.start_date.or(update.due_date),
                self.bridge
                    .capabilities()
                    .supported_frequencies(EntityKind::Reminder),
            )?;
        }
        self.ensure_granted(PermissionAlias::WriteReminders).await?;
        self.dispatch(
            self.bridge.modify_reminder(id, update),
            PermissionAlias::WriteReminders,
        )
        .await
    }

    /// Deletes reminders by id, independently per id.
    pub async fn delete_reminders_by_id(
        &self,
        ids: Vec<String>,
    ) -> CalendarResult<BTreeMap<String, DeleteOutcome>> {
        self.ensure_granted(PermissionAlias::WriteReminders).await?;
        let mut outcomes = BTreeMap::new();
        for id in ids {
            let outcome = if id.trim().is_empty() {
                DeleteOutcome::Failed {
                    error: CalendarError::invalid_argument("id must not be empty"),
                }
            } else {
                match self.bridge.delete_reminder(id.clone()).await {
                    Ok(()) => DeleteOutcome::Deleted,
                    Err(error) => DeleteOutcome::Failed {
                        error: CalendarError::from_bridge(error, PermissionAlias::WriteReminders),
                    },
                }
            };
            outcomes.insert(id, outcome);
        }
        Ok(outcomes)
    }

    // === Pipeline helpers ===

    fn validate_event_create(&self, params: &EventCreateParams) -> CalendarResult<()> {
        require_non_empty(&params.title, "title")?;
        if let (Some(start), Some(end)) = (params.start_date, params.end_date)
            && end < start
        {
            return Err(CalendarError::invalid_argument(
                "endDate must not precede startDate",
            ));
        }
        if let Some(rule) = &params.recurrence {
            rule.validate(
                params.start_date,
                self.bridge
                    .capabilities()
                    .supported_frequencies(EntityKind::Event),
            )?;
        }
        Ok(())
    }

    /// Fails fast with `PermissionDenied` unless the alias is granted or the
    /// platform has no permission concept for it.
    async fn ensure_granted(&self, alias: PermissionAlias) -> CalendarResult<()> {
        if !self.bridge.capabilities().supports(alias) {
            return Ok(());
        }
        let status = self.permissions.check(alias).await;
        if status.is_granted() {
            Ok(())
        } else {
            debug!(alias = %alias, status = %status, "failing fast before native dispatch");
            Err(CalendarError::permission_denied(alias, status))
        }
    }

    /// Pre-check for prompt-based operations: platforms whose prompt UIs
    /// carry call-scoped implicit access skip the grant requirement.
    async fn ensure_prompt_access(&self, alias: PermissionAlias) -> CalendarResult<()> {
        if self.bridge.capabilities().grants_implicitly(alias) {
            return Ok(());
        }
        self.ensure_granted(alias).await
    }

    async fn dispatch<T>(
        &self,
        call: unical_bridge::BoxFuture<'_, unical_bridge::BridgeResult<T>>,
        alias: PermissionAlias,
    ) -> CalendarResult<T> {
        call.await
            .map_err(|error| CalendarError::from_bridge(error, alias))
    }
}

fn require_non_empty(value: &str, field: &str) -> CalendarResult<()> {
    if value.trim().is_empty() {
        Err(CalendarError::invalid_argument(format!(
            "{field} must not be empty"
        )))
    } else {
        Ok(())
    }
}
