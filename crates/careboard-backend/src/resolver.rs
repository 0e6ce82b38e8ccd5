//! The resolver seam of the dispatcher.
//!
//! A resolver fulfills a read or write for one (method, resource key) pair.
//! Local resolvers (mock servers, in-process handlers) implement
//! [`ResourceResolver`] directly; ad hoc handlers go through [`FnResolver`].

use async_trait::async_trait;
use careboard_core::Params;
use serde_json::Value;
use std::future::Future;

use crate::error::BackendError;

/// A registered handler for one (method, resource key) pair.
///
/// Implementations must be thread-safe (`Send + Sync`). Errors returned
/// here propagate to the caller unchanged; the dispatcher never rewraps
/// them.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Fulfills the request, returning the raw payload.
    ///
    /// `body` is `None` for reads and carries the JSON body for writes.
    async fn resolve(&self, params: Params, body: Option<Value>) -> Result<Value, BackendError>;
}

/// Adapter turning an async closure into a [`ResourceResolver`].
pub struct FnResolver<F> {
    handler: F,
}

impl<F> FnResolver<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F, Fut> ResourceResolver for FnResolver<F>
where
    F: Fn(Params, Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, BackendError>> + Send,
{
    async fn resolve(&self, params: Params, body: Option<Value>) -> Result<Value, BackendError> {
        (self.handler)(params, body).await
    }
}
