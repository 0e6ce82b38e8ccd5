//! Error types for model registration, loading and contract checks.

use careboard_backend::BackendError;
use thiserror::Error;

/// Errors surfaced by the model cache/loader.
///
/// Contract violations are hard load failures, shaped exactly like a
/// transport failure from the caller's point of view: the load rejects
/// and nothing is cached.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A model was registered under an empty page key.
    #[error("page key must not be empty")]
    EmptyPageKey,

    /// No page definition exists for the requested page key.
    #[error("no model registered for {page}")]
    ModelNotRegistered { page: String },

    /// The transformed payload lacks required contract keys.
    #[error("Model {page} missing keys: {}", .keys.join(", "))]
    MissingKeys { page: String, keys: Vec<String> },

    /// A present key failed its contract validator.
    #[error("Model {page} failed validator for {key}")]
    ValidatorFailed { page: String, key: String },

    /// The dispatcher (resolver or transport) failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ModelError {
    /// Create a new ModelNotRegistered error.
    pub fn not_registered(page: impl Into<String>) -> Self {
        Self::ModelNotRegistered { page: page.into() }
    }
}

/// Convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
