//! Platform-agnostic calendar and reminders access layer.
//!
//! One [`CalendarClient`] fronts whatever native calendar subsystem the host
//! provides, behind the [`CalendarBridge`] seam:
//!
//! - [`CalendarClient`] - the unified contract: calendars, events, reminders,
//!   and the permission operations
//! - [`PermissionBroker`] - status checks and coalesced permission prompts
//! - [`CalendarError`] - the normalized error taxonomy every operation
//!   settles with
//!
//! Data shapes (entities, recurrence rules, parameter structs) live in
//! [`unical_core`]; bridge implementations live against [`unical_bridge`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use unical::CalendarClient;
//! use unical_bridge::InMemoryBridge;
//! use unical_core::EventCreateParams;
//!
//! # async fn run() -> Result<(), unical::CalendarError> {
//! let client = CalendarClient::new(Arc::new(InMemoryBridge::new()));
//! let snapshot = client.request_all_permissions().await;
//! if snapshot.write_calendar.is_granted() {
//!     let id = client
//!         .create_event(EventCreateParams::new("Standup").with_dates(0, 3_600_000))
//!         .await?;
//!     println!("created {id}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`CalendarBridge`]: unical_bridge::CalendarBridge

pub mod client;
pub mod error;
pub mod permissions;

// Re-export main types at crate root
pub use client::{CalendarClient, DeleteOutcome};
pub use error::{CalendarError, CalendarResult};
pub use permissions::PermissionBroker;
