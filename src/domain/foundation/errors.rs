//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }
}

/// Failure of a single call against the remote backend.
///
/// Every variant carries a human-readable message. Aggregation code does
/// not branch on the kind; it only reports `to_string()` to the UI. Callers
/// that care (e.g. to force a re-login) can inspect the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The backend could not be reached (DNS, connect, timeout, reset).
    #[error("{0}")]
    Transport(String),

    /// Missing or expired credential, rejected by the backend.
    #[error("{0}")]
    Auth(String),

    /// Non-2xx application response.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response arrived but could not be decoded.
    #[error("{0}")]
    MalformedResponse(String),
}

impl SyncError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an authorization error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a server error for the given HTTP status.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns true if this error indicates the user should sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }

    /// Returns true if a retry may succeed without any change on our side.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Transport(_) => true,
            SyncError::Server { status, .. } => *status >= 500,
            SyncError::Auth(_) | SyncError::MalformedResponse(_) => false,
        }
    }
}
