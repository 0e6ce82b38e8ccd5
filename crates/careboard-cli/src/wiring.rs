use std::sync::Arc;

use anyhow::{Context, Result, bail};
use careboard_backend::BackendConnector;
use careboard_models::{ModelConnector, register_core_models};
use url::Url;

/// The dispatcher and loader pair every command operates on.
pub struct Stack {
    pub backend: Arc<BackendConnector>,
    pub models: Arc<ModelConnector>,
}

/// Builds the dispatcher, optionally registers the mock resolvers, and
/// registers the core page models.
pub async fn build_stack(base_url: Option<String>, mock: bool) -> Result<Stack> {
    let backend = match base_url {
        Some(raw) => {
            let url = Url::parse(&raw).with_context(|| format!("Invalid base URL: {raw}"))?;
            Arc::new(BackendConnector::with_base_url(url))
        }
        None if mock => Arc::new(BackendConnector::new()),
        None => bail!(
            "No backend configured. Use --base-url, set CAREBOARD_URL, pass --mock, \
             or run: careboard config set base_url <url>"
        ),
    };

    if mock {
        careboard_mock::register_all(&backend).await?;
    }

    let models = Arc::new(ModelConnector::new(Arc::clone(&backend)));
    register_core_models(&models).await?;

    Ok(Stack { backend, models })
}
