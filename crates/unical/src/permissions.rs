//! Permission checks, requests, and prompt coalescing.
//!
//! [`PermissionBroker`] owns the in-flight-prompt registry: a mutex-guarded
//! map keyed by alias, the single point of mutual exclusion in the layer.
//! Concurrent requests for the same alias coalesce onto one native prompt —
//! the first caller leads and drives the bridge, later callers follow on a
//! `watch` channel and resolve to the same outcome. Requests for different
//! aliases proceed independently.
//!
//! Statuses are recomputed on every call; nothing here caches a stale
//! snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use unical_bridge::CalendarBridge;
use unical_core::{
    CalendarPermissionStatus, PermissionAlias, PermissionSnapshot, PermissionStatus,
    RemindersPermissionStatus,
};

use crate::error::{CalendarError, CalendarResult};

type PromptOutcome = CalendarResult<PermissionStatus>;
type Registry = HashMap<PermissionAlias, watch::Receiver<Option<PromptOutcome>>>;

enum PromptRole {
    Leader(watch::Sender<Option<PromptOutcome>>),
    Follower(watch::Receiver<Option<PromptOutcome>>),
}

/// Removes the leader's registry entry on drop.
///
/// Callers are free to stop awaiting a request mid-prompt; dropping the
/// leader's future must not strand its alias in the registry, or every later
/// request for that alias would follow a channel that can never settle.
struct RegisteredPrompt<'a> {
    broker: &'a PermissionBroker,
    alias: PermissionAlias,
}

impl Drop for RegisteredPrompt<'_> {
    fn drop(&mut self) {
        self.broker.registry().remove(&self.alias);
    }
}

/// Checks and requests permissions against one bridge, coalescing prompts.
pub struct PermissionBroker {
    bridge: Arc<dyn CalendarBridge>,
    in_flight: Mutex<Registry>,
}

impl PermissionBroker {
    /// Creates a broker over the given bridge.
    pub fn new(bridge: Arc<dyn CalendarBridge>) -> Self {
        Self {
            bridge,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the current status of one alias. Never prompts and never fails
    /// for a valid alias: an unsupported alias reports `Unknown`, and a
    /// bridge failure degrades to `Unknown`.
    pub async fn check(&self, alias: PermissionAlias) -> PermissionStatus {
        if !self.bridge.capabilities().supports(alias) {
            return PermissionStatus::Unknown;
        }
        match self.bridge.check_permission(alias).await {
            Ok(status) => status,
            Err(error) => {
                warn!(alias = %alias, error = %error, "permission check failed, reporting unknown");
                PermissionStatus::Unknown
            }
        }
    }

    /// Checks all four aliases, in the fixed order.
    pub async fn check_all(&self) -> PermissionSnapshot {
        let mut snapshot = PermissionSnapshot::default();
        for alias in PermissionAlias::ALL {
            snapshot.set(alias, self.check(alias).await);
        }
        snapshot
    }

    /// Requests one alias, prompting at most once.
    ///
    /// Returns the current status without a prompt when it is already
    /// granted, when the platform treats a denial as terminal, or when the
    /// alias is unsupported (`Unknown`). Otherwise triggers exactly one
    /// native prompt, shared with any concurrent request for the same alias.
    pub async fn request(&self, alias: PermissionAlias) -> CalendarResult<PermissionStatus> {
        let capabilities = self.bridge.capabilities();
        if !capabilities.supports(alias) {
            return Ok(PermissionStatus::Unknown);
        }
        let current = self.check(alias).await;
        if current.is_granted() {
            return Ok(current);
        }
        if current == PermissionStatus::Denied && !capabilities.allows_reprompt_after_denial() {
            debug!(alias = %alias, "denial is terminal on this platform, skipping prompt");
            return Ok(current);
        }

        loop {
            let role = {
                let mut registry = self.registry();
                match registry.get(&alias) {
                    Some(receiver) => PromptRole::Follower(receiver.clone()),
                    None => {
                        let (sender, receiver) = watch::channel(None);
                        registry.insert(alias, receiver);
                        PromptRole::Leader(sender)
                    }
                }
            };

            match role {
                PromptRole::Leader(sender) => {
                    let registration = RegisteredPrompt {
                        broker: self,
                        alias,
                    };
                    debug!(alias = %alias, "triggering native permission prompt");
                    let outcome = self
                        .bridge
                        .request_permission(alias)
                        .await
                        .map_err(|error| CalendarError::from_bridge(error, alias));
                    // Deregister before publishing so a caller arriving after
                    // the outcome starts a fresh prompt instead of following a
                    // settled one.
                    drop(registration);
                    let _ = sender.send(Some(outcome.clone()));
                    return outcome;
                }
                PromptRole::Follower(mut receiver) => {
                    debug!(alias = %alias, "coalescing onto in-flight prompt");
                    loop {
                        if let Some(outcome) = receiver.borrow_and_update().clone() {
                            return outcome;
                        }
                        if receiver.changed().await.is_err() {
                            // The leader stopped awaiting mid-prompt. Clear the
                            // stale entry unless a new leader already replaced
                            // it, then retry from the top.
                            let mut registry = self.registry();
                            if let Some(entry) = registry.get(&alias)
                                && entry.same_channel(&receiver)
                            {
                                registry.remove(&alias);
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Requests every alias lacking a grant, in the fixed order (read before
    /// write, calendar before reminders), each at most once. A per-alias
    /// native failure records `Unknown` rather than failing the aggregate.
    pub async fn request_all(&self) -> PermissionSnapshot {
        let mut snapshot = PermissionSnapshot::default();
        for alias in PermissionAlias::ALL {
            snapshot.set(alias, self.request_or_unknown(alias).await);
        }
        snapshot
    }

    /// Escalation: read access to calendars only.
    pub async fn request_read_only_calendar_access(&self) -> CalendarPermissionStatus {
        CalendarPermissionStatus {
            read_calendar: self.request_or_unknown(PermissionAlias::ReadCalendar).await,
            write_calendar: self.check(PermissionAlias::WriteCalendar).await,
        }
    }

    /// Escalation: write access to calendars only.
    pub async fn request_write_only_calendar_access(&self) -> CalendarPermissionStatus {
        CalendarPermissionStatus {
            read_calendar: self.check(PermissionAlias::ReadCalendar).await,
            write_calendar: self.request_or_unknown(PermissionAlias::WriteCalendar).await,
        }
    }

    /// Escalation: read and write access to calendars, read first.
    pub async fn request_full_calendar_access(&self) -> CalendarPermissionStatus {
        CalendarPermissionStatus {
            read_calendar: self.request_or_unknown(PermissionAlias::ReadCalendar).await,
            write_calendar: self.request_or_unknown(PermissionAlias::WriteCalendar).await,
        }
    }

    /// Escalation: read and write access to reminders, read first.
    pub async fn request_full_reminders_access(&self) -> RemindersPermissionStatus {
        RemindersPermissionStatus {
            read_reminders: self.request_or_unknown(PermissionAlias::ReadReminders).await,
            write_reminders: self
                .request_or_unknown(PermissionAlias::WriteReminders)
                .await,
        }
    }

    async fn request_or_unknown(&self, alias: PermissionAlias) -> PermissionStatus {
        match self.request(alias).await {
            Ok(status) => status,
            Err(error) => {
                warn!(alias = %alias, error = %error, "permission request failed, recording unknown");
                PermissionStatus::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use unical_bridge::{AliasAccess, CapabilityTable, InMemoryBridge};

    fn broker_over(bridge: InMemoryBridge) -> (Arc<InMemoryBridge>, PermissionBroker) {
        let bridge = Arc::new(bridge);
        let broker = PermissionBroker::new(bridge.clone());
        (bridge, broker)
    }

    #[tokio::test]
    async fn granted_alias_is_not_prompted() {
        let (bridge, broker) = broker_over(InMemoryBridge::new());
        let status = broker.request(PermissionAlias::ReadCalendar).await.unwrap();
        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 0);
    }

    #[tokio::test]
    async fn concurrent_requests_coalesce_into_one_prompt() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Prompt)
                .with_prompt_delay(Duration::from_millis(20)),
        );

        let (first, second, third) = tokio::join!(
            broker.request(PermissionAlias::ReadCalendar),
            broker.request(PermissionAlias::ReadCalendar),
            broker.request(PermissionAlias::ReadCalendar),
        );

        assert_eq!(first.unwrap(), PermissionStatus::Granted);
        assert_eq!(second.unwrap(), PermissionStatus::Granted);
        assert_eq!(third.unwrap(), PermissionStatus::Granted);
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 1);
    }

    #[tokio::test]
    async fn followers_observe_the_leaders_denial() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_status(PermissionAlias::WriteCalendar, PermissionStatus::Prompt)
                .with_prompt_result(PermissionAlias::WriteCalendar, PermissionStatus::Denied)
                .with_prompt_delay(Duration::from_millis(20)),
        );

        let (first, second) = tokio::join!(
            broker.request(PermissionAlias::WriteCalendar),
            broker.request(PermissionAlias::WriteCalendar),
        );

        assert_eq!(first.unwrap(), PermissionStatus::Denied);
        assert_eq!(second.unwrap(), PermissionStatus::Denied);
        assert_eq!(bridge.prompt_count(PermissionAlias::WriteCalendar), 1);
    }

    #[tokio::test]
    async fn different_aliases_prompt_independently() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Prompt)
                .with_status(PermissionAlias::ReadReminders, PermissionStatus::Prompt)
                .with_prompt_delay(Duration::from_millis(20)),
        );

        let (first, second) = tokio::join!(
            broker.request(PermissionAlias::ReadCalendar),
            broker.request(PermissionAlias::ReadReminders),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 1);
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadReminders), 1);
    }

    #[tokio::test]
    async fn request_all_prompts_missing_aliases_in_fixed_order() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Prompt)
                .with_status(PermissionAlias::ReadReminders, PermissionStatus::Prompt)
                .with_status(PermissionAlias::WriteReminders, PermissionStatus::Prompt),
        );

        let snapshot = broker.request_all().await;
        assert!(snapshot.read_calendar.is_granted());
        assert!(snapshot.write_calendar.is_granted());
        // already-granted write_calendar was not prompted; the rest were
        // prompted once each, read before write, calendar before reminders
        assert_eq!(
            bridge.prompt_log(),
            vec![
                PermissionAlias::ReadCalendar,
                PermissionAlias::ReadReminders,
                PermissionAlias::WriteReminders,
            ]
        );
    }

    #[tokio::test]
    async fn cancelled_request_does_not_wedge_the_alias() {
        let bridge = Arc::new(
            InMemoryBridge::new()
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Prompt)
                .with_prompt_delay(Duration::from_millis(20)),
        );
        let broker = Arc::new(PermissionBroker::new(bridge.clone()));

        let leader = tokio::spawn({
            let broker = broker.clone();
            async move { broker.request(PermissionAlias::ReadCalendar).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        leader.abort();
        let _ = leader.await;

        // the registry was cleaned up, so a fresh request leads a new prompt
        let status = broker.request(PermissionAlias::ReadCalendar).await.unwrap();
        assert_eq!(status, PermissionStatus::Granted);
    }

    #[tokio::test]
    async fn follower_takes_over_when_the_leader_is_cancelled() {
        let bridge = Arc::new(
            InMemoryBridge::new()
                .with_status(PermissionAlias::WriteCalendar, PermissionStatus::Prompt)
                .with_prompt_delay(Duration::from_millis(20)),
        );
        let broker = Arc::new(PermissionBroker::new(bridge.clone()));

        let leader = tokio::spawn({
            let broker = broker.clone();
            async move { broker.request(PermissionAlias::WriteCalendar).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let follower = tokio::spawn({
            let broker = broker.clone();
            async move { broker.request(PermissionAlias::WriteCalendar).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        leader.abort();

        let status = follower.await.unwrap().unwrap();
        assert_eq!(status, PermissionStatus::Granted);
    }

    #[tokio::test]
    async fn terminal_denial_short_circuits_without_prompt() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_capabilities(CapabilityTable::new().with_terminal_denial(true))
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Denied),
        );

        let status = broker.request(PermissionAlias::ReadCalendar).await.unwrap();
        assert_eq!(status, PermissionStatus::Denied);
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 0);
    }

    #[tokio::test]
    async fn non_terminal_denial_is_reprompted() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Denied),
        );

        let status = broker.request(PermissionAlias::ReadCalendar).await.unwrap();
        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 1);
    }

    #[tokio::test]
    async fn unsupported_alias_reports_unknown_without_native_calls() {
        let (bridge, broker) = broker_over(InMemoryBridge::new().with_capabilities(
            CapabilityTable::new()
                .with_access(PermissionAlias::ReadReminders, AliasAccess::Unsupported),
        ));

        assert_eq!(
            broker.check(PermissionAlias::ReadReminders).await,
            PermissionStatus::Unknown
        );
        assert_eq!(
            broker.request(PermissionAlias::ReadReminders).await.unwrap(),
            PermissionStatus::Unknown
        );
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadReminders), 0);

        // the aggregate keeps reporting the other aliases
        let snapshot = broker.check_all().await;
        assert_eq!(snapshot.read_reminders, PermissionStatus::Unknown);
        assert!(snapshot.read_calendar.is_granted());
    }

    #[tokio::test]
    async fn escalations_compose_the_primitives() {
        let (bridge, broker) = broker_over(
            InMemoryBridge::new()
                .with_status(PermissionAlias::ReadCalendar, PermissionStatus::Prompt)
                .with_status(PermissionAlias::WriteCalendar, PermissionStatus::Prompt),
        );

        let status = broker.request_read_only_calendar_access().await;
        assert!(status.read_calendar.is_granted());
        assert_eq!(bridge.prompt_count(PermissionAlias::WriteCalendar), 0);

        let status = broker.request_full_calendar_access().await;
        assert!(status.write_calendar.is_granted());
        // read was already granted by the previous escalation
        assert_eq!(bridge.prompt_count(PermissionAlias::ReadCalendar), 1);
        assert_eq!(bridge.prompt_count(PermissionAlias::WriteCalendar), 1);
    }
}
