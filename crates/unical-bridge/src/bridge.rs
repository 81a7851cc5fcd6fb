//! CalendarBridge trait definition.
//!
//! This module defines the [`CalendarBridge`] trait, the contract that every
//! native calendar backend (EventKit-backed, calendar-provider-backed, the
//! in-memory reference bridge) must satisfy, and the [`CapabilityTable`] a
//! bridge uses to declare how its platform's permission model behaves.
//!
//! Bridges never expand recurrences and never enforce permission policy —
//! they execute single native operations and report results in bridge
//! vocabulary. Policy (pre-checks, coalescing, validation, expansion) lives
//! in the dispatch layer above.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use unical_core::{
    Calendar, CalendarChooserOptions, CalendarCreateParams, CalendarEvent, CalendarSource,
    EventCreateParams, EventSpan, EventUpdate, Frequency, PermissionAlias, PermissionStatus,
    PromptResult, Reminder, ReminderCreateParams, ReminderList, ReminderUpdate, TimeRange,
};

use crate::error::{BridgeError, BridgeResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the dispatch layer can hold an
/// `Arc<dyn CalendarBridge>` chosen at runtime.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The entity kind a recurrence rule is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Event,
    Reminder,
}

/// How a platform grants access for one permission alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasAccess {
    /// Programmatic and prompt-based operations both require an explicit
    /// grant before any native access.
    ExplicitGrant,
    /// Programmatic operations require a grant, but the platform's modal
    /// prompt UIs carry call-scoped implicit access (no pre-grant needed).
    PromptImplicit,
    /// The platform has no permission concept for this alias.
    Unsupported,
}

/// A bridge's declaration of how its platform gates access.
///
/// This is the capability-set abstraction that unifies the two native
/// permission models: instead of platform branches at call sites, the
/// dispatch layer consults this table to decide which operations need a
/// pre-granted alias and which prompts may proceed without one.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    access: BTreeMap<PermissionAlias, AliasAccess>,
    /// Whether a denial is terminal on this platform (re-prompting is only
    /// possible through system settings, not through this layer).
    terminal_denial: bool,
    event_frequencies: Vec<Frequency>,
    reminder_frequencies: Vec<Frequency>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityTable {
    /// Creates a table where every alias requires an explicit grant, denial
    /// is not terminal, and all frequencies are supported for both kinds.
    pub fn new() -> Self {
        Self {
            access: PermissionAlias::ALL
                .into_iter()
                .map(|alias| (alias, AliasAccess::ExplicitGrant))
                .collect(),
            terminal_denial: false,
            event_frequencies: Frequency::ALL.to_vec(),
            reminder_frequencies: Frequency::ALL.to_vec(),
        }
    }

    /// Builder method to set the access model for one alias.
    pub fn with_access(mut self, alias: PermissionAlias, access: AliasAccess) -> Self {
        self.access.insert(alias, access);
        self
    }

    /// Builder method to mark denials terminal.
    pub fn with_terminal_denial(mut self, terminal: bool) -> Self {
        self.terminal_denial = terminal;
        self
    }

    /// Builder method to restrict the frequencies supported for a kind.
    pub fn with_frequencies(mut self, kind: EntityKind, frequencies: Vec<Frequency>) -> Self {
        match kind {
            EntityKind::Event => self.event_frequencies = frequencies,
            EntityKind::Reminder => self.reminder_frequencies = frequencies,
        }
        self
    }

    /// Returns the access model for an alias.
    pub fn access(&self, alias: PermissionAlias) -> AliasAccess {
        self.access
            .get(&alias)
            .copied()
            .unwrap_or(AliasAccess::ExplicitGrant)
    }

    /// Returns true if the platform has a permission concept for this alias.
    pub fn supports(&self, alias: PermissionAlias) -> bool {
        self.access(alias) != AliasAccess::Unsupported
    }

    /// Returns true if prompt-based operations touching this alias carry
    /// call-scoped implicit access.
    pub fn grants_implicitly(&self, alias: PermissionAlias) -> bool {
        self.access(alias) == AliasAccess::PromptImplicit
    }

    /// Returns true if a denied alias may be prompted again.
    pub fn allows_reprompt_after_denial(&self) -> bool {
        !self.terminal_denial
    }

    /// Returns the frequencies this bridge supports for the given kind.
    pub fn supported_frequencies(&self, kind: EntityKind) -> &[Frequency] {
        match kind {
            EntityKind::Event => &self.event_frequencies,
            EntityKind::Reminder => &self.reminder_frequencies,
        }
    }
}

/// The contract every native calendar backend satisfies.
///
/// All methods are single native operations: one permission check, one
/// prompt, one store mutation, one snapshot read. Parameters are taken by
/// value so implementations can move them into their futures.
///
/// # Implementation notes
///
/// - `events_in_range` returns series-level events whose span intersects the
///   window; recurrence expansion happens above the bridge.
/// - `request_permission` triggers exactly one native prompt per call; prompt
///   deduplication is the dispatch layer's responsibility.
/// - Prompt-based UI operations have default implementations reporting an
///   unsupported operation, since headless platforms have no prompt UIs.
pub trait CalendarBridge: Send + Sync {
    /// Returns the name of this bridge (e.g. "eventkit", "memory").
    fn name(&self) -> &str;

    /// Returns this bridge's permission/recurrence capability table.
    fn capabilities(&self) -> &CapabilityTable;

    /// Reads the current status of one alias. Never prompts.
    fn check_permission(
        &self,
        alias: PermissionAlias,
    ) -> BoxFuture<'_, BridgeResult<PermissionStatus>>;

    /// Triggers one native prompt for the alias and reports the resulting
    /// status.
    fn request_permission(
        &self,
        alias: PermissionAlias,
    ) -> BoxFuture<'_, BridgeResult<PermissionStatus>>;

    /// Lists all calendars visible to the app.
    fn list_calendars(&self) -> BoxFuture<'_, BridgeResult<Vec<Calendar>>>;

    /// Returns the store's default calendar, if it has one.
    fn default_calendar(&self) -> BoxFuture<'_, BridgeResult<Option<Calendar>>>;

    /// Lists the sources/accounts backing the calendar store.
    fn calendar_sources(&self) -> BoxFuture<'_, BridgeResult<Vec<CalendarSource>>>;

    /// Creates a calendar and returns its store-assigned id.
    fn create_calendar(&self, params: CalendarCreateParams) -> BoxFuture<'_, BridgeResult<String>>;

    /// Deletes a calendar by id.
    fn delete_calendar(&self, id: String) -> BoxFuture<'_, BridgeResult<()>>;

    /// Returns series-level events intersecting the window, unexpanded.
    fn events_in_range(&self, range: TimeRange) -> BoxFuture<'_, BridgeResult<Vec<CalendarEvent>>>;

    /// Creates an event and returns its store-assigned id.
    fn create_event(&self, params: EventCreateParams) -> BoxFuture<'_, BridgeResult<String>>;

    /// Opens the native event-creation UI pre-filled with `params`.
    fn create_event_with_prompt(
        &self,
        _params: EventCreateParams,
    ) -> BoxFuture<'_, BridgeResult<PromptResult>> {
        Box::pin(async {
            Err(BridgeError::unsupported(
                "event creation prompt is not available on this platform",
            ))
        })
    }

    /// Applies a partial update to an event.
    fn modify_event(
        &self,
        id: String,
        update: EventUpdate,
        span: EventSpan,
    ) -> BoxFuture<'_, BridgeResult<()>>;

    /// Opens the native event-editing UI for the event.
    fn modify_event_with_prompt(
        &self,
        _id: String,
        _update: EventUpdate,
        _span: EventSpan,
    ) -> BoxFuture<'_, BridgeResult<PromptResult>> {
        Box::pin(async {
            Err(BridgeError::unsupported(
                "event editing prompt is not available on this platform",
            ))
        })
    }

    /// Deletes one event series by id.
    fn delete_event(&self, id: String) -> BoxFuture<'_, BridgeResult<()>>;

    /// Presents the native calendar chooser; cancellation yields an empty
    /// selection, not an error.
    fn select_calendars_with_prompt(
        &self,
        _options: CalendarChooserOptions,
    ) -> BoxFuture<'_, BridgeResult<Vec<Calendar>>> {
        Box::pin(async {
            Err(BridgeError::unsupported(
                "calendar chooser is not available on this platform",
            ))
        })
    }

    /// Lists all reminder lists.
    fn reminder_lists(&self) -> BoxFuture<'_, BridgeResult<Vec<ReminderList>>>;

    /// Returns the store's default reminder list, if it has one.
    fn default_reminder_list(&self) -> BoxFuture<'_, BridgeResult<Option<ReminderList>>>;

    /// Lists the sources/accounts backing the reminders store.
    fn reminder_sources(&self) -> BoxFuture<'_, BridgeResult<Vec<CalendarSource>>>;

    /// Returns reminders from the given lists; an empty `list_ids` means all
    /// lists.
    fn reminders_in_lists(&self, list_ids: Vec<String>)
        -> BoxFuture<'_, BridgeResult<Vec<Reminder>>>;

    /// Creates a reminder and returns its store-assigned id.
    fn create_reminder(&self, params: ReminderCreateParams) -> BoxFuture<'_, BridgeResult<String>>;

    /// Applies a partial update to a reminder.
    fn modify_reminder(&self, id: String, update: ReminderUpdate)
        -> BoxFuture<'_, BridgeResult<()>>;

    /// Deletes one reminder by id.
    fn delete_reminder(&self, id: String) -> BoxFuture<'_, BridgeResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_requires_explicit_grants() {
        let table = CapabilityTable::new();
        for alias in PermissionAlias::ALL {
            assert_eq!(table.access(alias), AliasAccess::ExplicitGrant);
            assert!(table.supports(alias));
            assert!(!table.grants_implicitly(alias));
        }
        assert!(table.allows_reprompt_after_denial());
    }

    #[test]
    fn table_builder_overrides() {
        let table = CapabilityTable::new()
            .with_access(PermissionAlias::WriteCalendar, AliasAccess::PromptImplicit)
            .with_access(PermissionAlias::ReadReminders, AliasAccess::Unsupported)
            .with_terminal_denial(true);

        assert!(table.grants_implicitly(PermissionAlias::WriteCalendar));
        assert!(!table.supports(PermissionAlias::ReadReminders));
        assert!(!table.allows_reprompt_after_denial());
        // untouched aliases keep the default
        assert_eq!(
            table.access(PermissionAlias::ReadCalendar),
            AliasAccess::ExplicitGrant
        );
    }

    #[test]
    fn frequency_restrictions_per_kind() {
        let table = CapabilityTable::new()
            .with_frequencies(EntityKind::Reminder, vec![Frequency::Daily, Frequency::Weekly]);

        assert_eq!(table.supported_frequencies(EntityKind::Event).len(), 4);
        assert_eq!(
            table.supported_frequencies(EntityKind::Reminder),
            &[Frequency::Daily, Frequency::Weekly]
        );
    }
}
