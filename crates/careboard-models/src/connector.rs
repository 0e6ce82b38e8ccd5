//! The `ModelConnector`: per-page caching and contract-validating loader.

use std::collections::HashMap;
use std::sync::Arc;

use careboard_backend::BackendConnector;
use careboard_core::Params;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::registry::{ModelDefinition, PageModel};

/// Options for a single page load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Bypass the cache and overwrite the entry on success.
    pub force_refresh: bool,
}

impl LoadOptions {
    pub fn force() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

/// Orchestrates page loads: cache lookup, dispatcher call, transform,
/// contract check, cache store.
///
/// Construct one per application wiring; the cache is owned state, never a
/// process-wide singleton, so tests can build independent instances.
pub struct ModelConnector {
    backend: Arc<BackendConnector>,
    models: RwLock<HashMap<String, PageModel>>,
    cache: RwLock<HashMap<String, Value>>,
}

impl ModelConnector {
    pub fn new(backend: Arc<BackendConnector>) -> Self {
        Self {
            backend,
            models: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The dispatcher this loader reads through.
    pub fn backend(&self) -> &Arc<BackendConnector> {
        &self.backend
    }

    /// Stores a page definition; re-registration silently overwrites
    /// (last-write-wins, so model definitions can be hot-swapped).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyPageKey`] for an empty page key.
    pub async fn register_model(&self, page_key: &str, definition: ModelDefinition) -> Result<()> {
        if page_key.is_empty() {
            return Err(ModelError::EmptyPageKey);
        }
        let model = definition.into_page_model(page_key);
        self.models
            .write()
            .await
            .insert(page_key.to_string(), model);
        Ok(())
    }

    /// Page keys currently registered, sorted.
    pub async fn pages(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.models.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// (page key, backing resource) pairs, sorted by page key.
    pub async fn page_resources(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .models
            .read()
            .await
            .iter()
            .map(|(page, model)| (page.clone(), model.resource.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Canonical cache key for a (page, params) pair.
    ///
    /// The page key alone when params are empty, otherwise
    /// `page + ":" + JSON(params)`. `Params` is a sorted map, so two
    /// parameter sets with the same pairs produce the same key no matter
    /// the insertion order.
    pub fn create_cache_key(page_key: &str, params: &Params) -> String {
        if params.is_empty() {
            return page_key.to_string();
        }
        let serialized = serde_json::to_string(params).unwrap_or_default();
        format!("{page_key}:{serialized}")
    }

    /// Loads a page's view model.
    ///
    /// A cache hit (without `force_refresh`) returns immediately without
    /// touching the registry or the dispatcher. On a miss: dispatch the
    /// read with the page key merged into the request params, transform,
    /// check the contract, cache, return. Any failure caches nothing.
    ///
    /// Concurrent identical loads are not deduplicated; the later
    /// completion overwrites the cache entry. Transforms are pure, so
    /// both completions carry the same view model for the same payload.
    pub async fn load(&self, page_key: &str, params: Params, options: LoadOptions) -> Result<Value> {
        let mut request_params = params;
        request_params.insert("pageKey".to_string(), Value::String(page_key.to_string()));
        let cache_key = Self::create_cache_key(page_key, &request_params);

        if !options.force_refresh
            && let Some(hit) = self.cache.read().await.get(&cache_key)
        {
            debug!(page = %page_key, %cache_key, "page cache hit");
            return Ok(hit.clone());
        }

        let model = self
            .models
            .read()
            .await
            .get(page_key)
            .cloned()
            .ok_or_else(|| ModelError::not_registered(page_key))?;

        debug!(page = %page_key, resource = %model.resource, "loading page from backend");
        let raw = self
            .backend
            .get(&model.resource, request_params.clone())
            .await?;
        let view = (model.transform)(raw, &request_params);
        if let Some(contract) = &model.contract {
            contract.check(page_key, &view)?;
        }

        self.cache.write().await.insert(cache_key, view.clone());
        Ok(view)
    }

    /// Invalidates cached entries.
    ///
    /// With a page key, removes the bare entry and every parameter variant
    /// (`page` and `page:*`). With `None`, clears the whole cache.
    pub async fn clear_cache(&self, page_key: Option<&str>) {
        let mut cache = self.cache.write().await;
        match page_key {
            Some(page) => {
                let prefix = format!("{page}:");
                cache.retain(|key, _| key.as_str() != page && !key.starts_with(&prefix));
                debug!(page = %page, "invalidated page cache");
            }
            None => {
                cache.clear();
                debug!("invalidated entire model cache");
            }
        }
    }

    /// Number of live cache entries (test and debugging aid).
    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_for_empty_params_is_the_page_key() {
        assert_eq!(
            ModelConnector::create_cache_key("Patients", &Params::new()),
            "Patients"
        );
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let mut first = Params::new();
        first.insert("hospital_id".into(), json!(1));
        first.insert("days_back".into(), json!(30));

        let mut second = Params::new();
        second.insert("days_back".into(), json!(30));
        second.insert("hospital_id".into(), json!(1));

        assert_eq!(
            ModelConnector::create_cache_key("Billing", &first),
            ModelConnector::create_cache_key("Billing", &second)
        );
    }

    #[test]
    fn test_cache_key_distinguishes_values() {
        let mut first = Params::new();
        first.insert("hospital_id".into(), json!(1));
        let mut second = Params::new();
        second.insert("hospital_id".into(), json!(2));

        assert_ne!(
            ModelConnector::create_cache_key("Billing", &first),
            ModelConnector::create_cache_key("Billing", &second)
        );
    }

    #[tokio::test]
    async fn test_register_model_rejects_empty_page_key() {
        let backend = Arc::new(careboard_backend::BackendConnector::new());
        let models = ModelConnector::new(backend);
        let err = models
            .register_model("", ModelDefinition::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyPageKey));
    }
}
