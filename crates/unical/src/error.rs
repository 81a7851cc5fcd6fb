//! The unified caller-facing error taxonomy.
//!
//! Validation errors (`InvalidRecurrence`, `InvalidArgument`) and permission
//! pre-check failures are raised by the dispatch layer before native code is
//! reached; everything else originates in a bridge and is normalized here via
//! [`CalendarError::from_bridge`] rather than swallowed. User cancellation of
//! a native UI is never an error — prompt operations report it as a
//! successful result.
//!
//! Errors are `Clone` so a coalesced permission prompt can hand the same
//! outcome to every awaiting caller, and `Serialize` so callers can log and
//! display them structurally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use unical_bridge::{BridgeError, BridgeErrorCode};
use unical_core::{PermissionAlias, PermissionStatus, RecurrenceError};

/// An error resolving a contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum CalendarError {
    /// The operation requires a permission the platform has not granted.
    #[error("permission {alias} is {status}, not granted")]
    PermissionDenied {
        alias: PermissionAlias,
        status: PermissionStatus,
    },

    /// The supplied recurrence rule is malformed.
    #[error("invalid recurrence rule: {reason}")]
    InvalidRecurrence { reason: RecurrenceError },

    /// A required field is missing or an argument is malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The referenced entity does not exist in the native store.
    #[error("entity not found: {message}")]
    EntityNotFound { message: String },

    /// The native operation failed; the message carries the platform wording.
    #[error("native operation failed via {bridge}: {message}")]
    NativeOperationFailed { bridge: String, message: String },
}

impl CalendarError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a permission-denied error for an alias observed in `status`.
    pub fn permission_denied(alias: PermissionAlias, status: PermissionStatus) -> Self {
        Self::PermissionDenied { alias, status }
    }

    /// Creates a native-failure error attributed to a bridge.
    pub fn native(bridge: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NativeOperationFailed {
            bridge: bridge.into(),
            message: message.into(),
        }
    }

    /// Normalizes a bridge error into the unified taxonomy.
    ///
    /// `alias` is the permission the failing operation was gated on, used
    /// when the native store itself refused the call.
    pub fn from_bridge(error: BridgeError, alias: PermissionAlias) -> Self {
        match error.code() {
            BridgeErrorCode::NotFound => Self::EntityNotFound {
                message: error.message().to_string(),
            },
            BridgeErrorCode::PermissionRefused => Self::PermissionDenied {
                alias,
                status: PermissionStatus::Denied,
            },
            BridgeErrorCode::InvalidInput => Self::InvalidArgument {
                message: error.message().to_string(),
            },
            BridgeErrorCode::Unsupported
            | BridgeErrorCode::PlatformFailure
            | BridgeErrorCode::Internal => Self::NativeOperationFailed {
                bridge: error.bridge().unwrap_or("unknown").to_string(),
                message: error.message().to_string(),
            },
        }
    }

    /// Returns a stable name for this error, for logs and structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "permission_denied",
            Self::InvalidRecurrence { .. } => "invalid_recurrence",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::NativeOperationFailed { .. } => "native_operation_failed",
        }
    }
}

impl From<RecurrenceError> for CalendarError {
    fn from(reason: RecurrenceError) -> Self {
        Self::InvalidRecurrence { reason }
    }
}

/// A specialized Result type for contract operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_not_found_becomes_entity_not_found() {
        let err = CalendarError::from_bridge(
            BridgeError::not_found("event evt-9 does not exist"),
            PermissionAlias::WriteCalendar,
        );
        assert_eq!(err.code(), "entity_not_found");
        assert!(err.to_string().contains("evt-9"));
    }

    #[test]
    fn bridge_refusal_becomes_permission_denied_for_the_gating_alias() {
        let err = CalendarError::from_bridge(
            BridgeError::permission_refused("store refused write"),
            PermissionAlias::WriteReminders,
        );
        assert_eq!(
            err,
            CalendarError::PermissionDenied {
                alias: PermissionAlias::WriteReminders,
                status: PermissionStatus::Denied,
            }
        );
    }

    #[test]
    fn opaque_failures_keep_the_platform_message() {
        let err = CalendarError::from_bridge(
            BridgeError::platform("EKErrorDomain code 11").with_bridge("eventkit"),
            PermissionAlias::WriteCalendar,
        );
        assert_eq!(
            err,
            CalendarError::NativeOperationFailed {
                bridge: "eventkit".to_string(),
                message: "EKErrorDomain code 11".to_string(),
            }
        );
    }

    #[test]
    fn recurrence_error_converts() {
        let err: CalendarError = RecurrenceError::IntervalZero.into();
        assert_eq!(err.code(), "invalid_recurrence");
    }

    #[test]
    fn serialized_shape_carries_the_code_tag() {
        let err = CalendarError::invalid_argument("title must not be empty");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "invalidArgument");
        assert_eq!(json["message"], "title must not be empty");
    }
}
