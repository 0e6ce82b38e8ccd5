//! Error types for the resource dispatcher.

use thiserror::Error;

/// Errors surfaced by the dispatcher or its registered resolvers.
///
/// Business errors raised by resolvers ([`BackendError::InvalidPayload`],
/// [`BackendError::Conflict`]) display their message verbatim; the UI layer
/// shows them as-is. Transport failures are normalized into
/// [`BackendError::Upstream`] and [`BackendError::Request`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// A resource key was empty at registration or dispatch time.
    #[error("resource key must not be empty")]
    EmptyResourceKey,

    /// A resolver rejected the request payload (missing or malformed fields).
    #[error("{message}")]
    InvalidPayload { message: String },

    /// A resolver detected a conflicting identifier (duplicate iid, cin, ...).
    #[error("{message}")]
    Conflict { message: String },

    /// No resolver is registered and no base URL is configured.
    #[error("no resolver or transport available for {resource}")]
    NoTransport { resource: String },

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Upstream {
        resource: String,
        status: u16,
        message: String,
    },

    /// The network call itself failed (connect, timeout, body read).
    #[error("backend request failed for {resource}: {source}")]
    Request {
        resource: String,
        #[source]
        source: reqwest::Error,
    },
}

impl BackendError {
    /// Create a new InvalidPayload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Create a new Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new Upstream error.
    ///
    /// When the error body carried no usable `message`, the generic
    /// status-and-resource form is used.
    pub fn upstream(resource: impl Into<String>, status: u16, message: Option<String>) -> Self {
        let resource = resource.into();
        let message = message
            .unwrap_or_else(|| format!("Backend responded with status {status} for {resource}"));
        Self::Upstream {
            resource,
            status,
            message,
        }
    }

    /// Whether this error originated in a resolver's business validation.
    pub fn is_business(&self) -> bool {
        matches!(self, Self::InvalidPayload { .. } | Self::Conflict { .. })
    }
}

/// Convenience result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, BackendError>;
