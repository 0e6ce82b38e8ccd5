//! Resource-resolver dispatch for the careboard data-access layer.
//!
//! The [`BackendConnector`] maps (method, resource key) pairs to registered
//! [`ResourceResolver`]s and falls back to a real HTTP transport for keys
//! nobody claimed locally. Resolver errors propagate unchanged; transport
//! failures are normalized into a single error kind.

mod connector;
mod error;
mod resolver;

pub use connector::{BackendConnector, ResolverKey, ResolverRegistration};
pub use error::{BackendError, Result};
pub use resolver::{FnResolver, ResourceResolver};
