//! CalendarBridge trait and the in-memory reference bridge.
//!
//! This crate is the seam between the platform-agnostic access layer and the
//! native calendar subsystems:
//!
//! - [`CalendarBridge`] - the contract every native backend implements
//! - [`CapabilityTable`] - a bridge's declaration of its platform's
//!   permission model and recurrence support
//! - [`BridgeError`] - the error shape bridges report failures in
//! - [`InMemoryBridge`] - a complete in-process bridge used as reference
//!   implementation and test double
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────────┐
//! │   EventKit   │   │ Calendar provider │   │  In-process  │
//! └──────┬───────┘   └─────────┬─────────┘   └──────┬───────┘
//!        ▼                     ▼                    ▼
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────────┐
//! │ (iOS bridge) │   │ (Android bridge)  │   │InMemoryBridge│
//! └──────┬───────┘   └─────────┬─────────┘   └──────┬───────┘
//!        │                     │                    │
//!        │         CalendarBridge + CapabilityTable │
//!        └─────────────────────┴────────────────────┘
//!                              │
//!                              ▼ dispatch layer (unical)
//! ```

pub mod bridge;
pub mod error;
pub mod memory;

// Re-export main types at crate root
pub use bridge::{AliasAccess, BoxFuture, CalendarBridge, CapabilityTable, EntityKind};
pub use error::{BridgeError, BridgeErrorCode, BridgeResult};
pub use memory::InMemoryBridge;
