//! Error types for bridge operations.
//!
//! Bridges report failures in their own native vocabulary; this module gives
//! them one shape to do it in. The dispatch layer maps these into the unified
//! caller-facing taxonomy.

use std::fmt;
use thiserror::Error;

/// The category of a bridge error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeErrorCode {
    /// The referenced entity does not exist in the native store.
    NotFound,
    /// The native store refused the operation for lack of permission.
    PermissionRefused,
    /// The request was malformed as far as the native store is concerned.
    InvalidInput,
    /// The bridge does not implement this operation on this platform.
    Unsupported,
    /// The native call failed; the message carries the platform's wording.
    PlatformFailure,
    /// Unexpected bridge-internal state.
    Internal,
}

impl BridgeErrorCode {
    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionRefused => "permission_refused",
            Self::InvalidInput => "invalid_input",
            Self::Unsupported => "unsupported",
            Self::PlatformFailure => "platform_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for BridgeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error reported by a native bridge.
#[derive(Debug, Error)]
pub struct BridgeError {
    /// The error code categorizing this error.
    code: BridgeErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The bridge that generated this error (e.g. "eventkit", "memory").
    bridge: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BridgeError {
    /// Creates a new bridge error with the given code and message.
    pub fn new(code: BridgeErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            bridge: None,
            source: None,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::NotFound, message)
    }

    /// Creates a permission-refused error.
    pub fn permission_refused(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::PermissionRefused, message)
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::InvalidInput, message)
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::Unsupported, message)
    }

    /// Creates a platform-failure error.
    pub fn platform(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::PlatformFailure, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::Internal, message)
    }

    /// Sets the bridge name for this error.
    pub fn with_bridge(mut self, bridge: impl Into<String>) -> Self {
        self.bridge = Some(bridge.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> BridgeErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the bridge name, if set.
    pub fn bridge(&self) -> Option<&str> {
        self.bridge.as_deref()
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref bridge) = self.bridge {
            write!(f, "[{}] ", bridge)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_names() {
        assert_eq!(BridgeErrorCode::NotFound.as_str(), "not_found");
        assert_eq!(
            BridgeErrorCode::PermissionRefused.as_str(),
            "permission_refused"
        );
    }

    #[test]
    fn error_creation() {
        let err = BridgeError::not_found("event evt-1 is unknown");
        assert_eq!(err.code(), BridgeErrorCode::NotFound);
        assert_eq!(err.message(), "event evt-1 is unknown");
        assert!(err.bridge().is_none());
    }

    #[test]
    fn display_includes_bridge_name() {
        let err = BridgeError::platform("store unavailable").with_bridge("memory");
        let display = format!("{}", err);
        assert!(display.contains("[memory]"));
        assert!(display.contains("platform_failure"));
        assert!(display.contains("store unavailable"));
    }

    #[test]
    fn source_is_preserved() {
        use std::error::Error;
        let io_err = std::io::Error::other("broken pipe");
        let err = BridgeError::internal("native call failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
