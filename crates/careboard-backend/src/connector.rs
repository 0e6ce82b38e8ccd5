//! The `BackendConnector`: resolver dispatch with an HTTP fallback.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use careboard_core::{Method, Params, query_pairs};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::{BackendError, Result};
use crate::resolver::{FnResolver, ResourceResolver};

/// Composite key selecting exactly one resolver.
///
/// A struct key rather than a `"GET::key"` string, so resource keys
/// containing a delimiter can never collide across methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolverKey {
    method: Method,
    resource: String,
}

impl ResolverKey {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
        }
    }
}

type ResolverMap = HashMap<ResolverKey, Arc<dyn ResourceResolver>>;

/// Handle returned by [`BackendConnector::register_resource`].
///
/// Dropping the handle keeps the resolver registered; calling
/// [`ResolverRegistration::unregister`] removes the (method, resource key)
/// binding, whatever resolver currently occupies it.
pub struct ResolverRegistration {
    resolvers: Arc<RwLock<ResolverMap>>,
    key: ResolverKey,
}

impl std::fmt::Debug for ResolverRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistration")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ResolverRegistration {
    pub async fn unregister(self) {
        self.resolvers.write().await.remove(&self.key);
    }
}

/// Dispatches reads and writes to registered resolvers, falling back to a
/// real HTTP transport for resource keys nobody claimed locally.
///
/// Registration is last-write-wins per (method, resource key) pair.
pub struct BackendConnector {
    http: reqwest::Client,
    base_url: Option<Url>,
    resolvers: Arc<RwLock<ResolverMap>>,
}

impl BackendConnector {
    /// Creates a connector with no transport; every resource key must be
    /// served by a registered resolver.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: None,
            resolvers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a connector that falls back to HTTP calls under `base_url`.
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            ..Self::new()
        }
    }

    /// Associates a resolver with a (method, resource key) pair.
    ///
    /// Re-registering the same pair silently replaces the previous resolver.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::EmptyResourceKey`] for an empty key.
    pub async fn register_resource(
        &self,
        resource_key: &str,
        resolver: Arc<dyn ResourceResolver>,
        method: Method,
    ) -> Result<ResolverRegistration> {
        if resource_key.is_empty() {
            return Err(BackendError::EmptyResourceKey);
        }
        let key = ResolverKey::new(method, resource_key);
        self.resolvers.write().await.insert(key.clone(), resolver);
        debug!(resource = %resource_key, method = %method, "registered resolver");
        Ok(ResolverRegistration {
            resolvers: Arc::clone(&self.resolvers),
            key,
        })
    }

    /// Registers an async closure as a resolver.
    pub async fn register_fn<F, Fut>(
        &self,
        resource_key: &str,
        method: Method,
        handler: F,
    ) -> Result<ResolverRegistration>
    where
        F: Fn(Params, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.register_resource(resource_key, Arc::new(FnResolver::new(handler)), method)
            .await
    }

    /// Issues a read for `resource_key`.
    pub async fn get(&self, resource_key: &str, params: Params) -> Result<Value> {
        self.request(Method::Get, resource_key, params, None).await
    }

    /// Issues a write for `resource_key`.
    pub async fn post(&self, resource_key: &str, body: Value, params: Params) -> Result<Value> {
        self.request(Method::Post, resource_key, params, Some(body))
            .await
    }

    async fn request(
        &self,
        method: Method,
        resource_key: &str,
        params: Params,
        body: Option<Value>,
    ) -> Result<Value> {
        if resource_key.is_empty() {
            return Err(BackendError::EmptyResourceKey);
        }

        let resolver = {
            let resolvers = self.resolvers.read().await;
            resolvers
                .get(&ResolverKey::new(method, resource_key))
                .cloned()
        };

        if let Some(resolver) = resolver {
            debug!(resource = %resource_key, method = %method, "dispatching to local resolver");
            return resolver.resolve(params, body).await;
        }

        self.fetch(method, resource_key, params, body).await
    }

    async fn fetch(
        &self,
        method: Method,
        resource_key: &str,
        params: Params,
        body: Option<Value>,
    ) -> Result<Value> {
        let Some(base_url) = &self.base_url else {
            return Err(BackendError::NoTransport {
                resource: resource_key.to_string(),
            });
        };

        let url = format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            resource_key
        );
        debug!(resource = %resource_key, method = %method, %url, "falling back to transport");

        let mut request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self
                .http
                .post(&url)
                .json(&body.unwrap_or_else(|| json!({}))),
        };
        let pairs = query_pairs(&params);
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }

        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Request {
                resource: resource_key.to_string(),
                source,
            })?;

        Self::normalize_response(resource_key, response).await
    }

    /// Parses the body per its content type and translates non-success
    /// statuses into errors.
    async fn normalize_response(resource_key: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let payload = if is_json {
            // An unparseable JSON body degrades to null rather than failing
            // the request outright; the status check below still applies.
            response.json::<Value>().await.unwrap_or(Value::Null)
        } else {
            let text = response
                .text()
                .await
                .map_err(|source| BackendError::Request {
                    resource: resource_key.to_string(),
                    source,
                })?;
            Value::String(text)
        };

        if !status.is_success() {
            let message = payload
                .as_object()
                .and_then(|obj| obj.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(BackendError::upstream(
                resource_key,
                status.as_u16(),
                message,
            ));
        }

        Ok(payload)
    }
}

impl Default for BackendConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_of(entries: &[(&str, Value)]) -> Params {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_registered_resolver_handles_get() {
        let backend = BackendConnector::new();
        backend
            .register_fn("patients", Method::Get, |_params, _body| async {
                Ok(json!({"patients": []}))
            })
            .await
            .unwrap();

        let out = backend.get("patients", Params::new()).await.unwrap();
        assert_eq!(out, json!({"patients": []}));
    }

    #[tokio::test]
    async fn test_empty_resource_key_rejected() {
        let backend = BackendConnector::new();
        let err = backend.get("", Params::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::EmptyResourceKey));

        let err = backend
            .register_fn("", Method::Get, |_p, _b| async { Ok(Value::Null) })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::EmptyResourceKey));
    }

    #[tokio::test]
    async fn test_methods_use_distinct_resolvers() {
        let backend = BackendConnector::new();
        backend
            .register_fn("staff", Method::Get, |_p, _b| async {
                Ok(json!("read"))
            })
            .await
            .unwrap();
        backend
            .register_fn("staff", Method::Post, |_p, _b| async {
                Ok(json!("write"))
            })
            .await
            .unwrap();

        assert_eq!(
            backend.get("staff", Params::new()).await.unwrap(),
            json!("read")
        );
        assert_eq!(
            backend
                .post("staff", json!({}), Params::new())
                .await
                .unwrap(),
            json!("write")
        );
    }

    #[tokio::test]
    async fn test_delimiter_in_resource_key_cannot_collide() {
        // With a struct key, a resource literally named "GET::billing" is
        // unrelated to the GET resolver for "billing".
        let backend = BackendConnector::new();
        backend
            .register_fn("billing", Method::Get, |_p, _b| async {
                Ok(json!("billing"))
            })
            .await
            .unwrap();

        let err = backend.get("GET::billing", Params::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::NoTransport { .. }));
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let backend = BackendConnector::new();
        backend
            .register_fn("medications", Method::Get, |_p, _b| async {
                Ok(json!("first"))
            })
            .await
            .unwrap();
        backend
            .register_fn("medications", Method::Get, |_p, _b| async {
                Ok(json!("second"))
            })
            .await
            .unwrap();

        assert_eq!(
            backend.get("medications", Params::new()).await.unwrap(),
            json!("second")
        );
    }

    #[tokio::test]
    async fn test_unregister_removes_binding() {
        let backend = BackendConnector::new();
        let registration = backend
            .register_fn("appointments", Method::Get, |_p, _b| async {
                Ok(json!([]))
            })
            .await
            .unwrap();

        registration.unregister().await;
        let err = backend.get("appointments", Params::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::NoTransport { .. }));
    }

    #[tokio::test]
    async fn test_resolver_error_propagates_verbatim() {
        let backend = BackendConnector::new();
        backend
            .register_fn("patients", Method::Post, |_p, _b| async {
                Err(BackendError::invalid_payload("Missing fields: cin"))
            })
            .await
            .unwrap();

        let err = backend
            .post("patients", json!({}), Params::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing fields: cin");
    }

    #[tokio::test]
    async fn test_resolver_sees_params_and_body() {
        let backend = BackendConnector::new();
        backend
            .register_fn("billing", Method::Post, |params, body| async move {
                Ok(json!({
                    "hospital": params.get("hospital_id").cloned(),
                    "total": body.and_then(|b| b.get("total").cloned()),
                }))
            })
            .await
            .unwrap();

        let out = backend
            .post(
                "billing",
                json!({"total": 420}),
                params_of(&[("hospital_id", json!(3))]),
            )
            .await
            .unwrap();
        assert_eq!(out, json!({"hospital": 3, "total": 420}));
    }
}
