//! Page definitions and the built-in page model registrations.

use std::sync::Arc;

use careboard_core::Params;
use serde_json::Value;

use crate::connector::ModelConnector;
use crate::contract::ModelContract;
use crate::error::Result;
use crate::pages;

/// A pure transform from raw backend payload to UI-ready view model.
///
/// Purity is load-bearing: the cache returns stored view models without
/// re-invoking the transform, so the same raw payload must always produce
/// the same view model.
pub type TransformFn = dyn Fn(Value, &Params) -> Value + Send + Sync;

/// A registered page model: resource key, transform and optional contract.
#[derive(Clone)]
pub struct PageModel {
    pub resource: String,
    pub transform: Arc<TransformFn>,
    pub contract: Option<ModelContract>,
}

/// Builder for a page registration.
///
/// The resource defaults to the page key itself and the transform to the
/// identity function.
#[derive(Default)]
pub struct ModelDefinition {
    resource: Option<String>,
    transform: Option<Arc<TransformFn>>,
    contract: Option<ModelContract>,
}

impl ModelDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value, &Params) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn contract(mut self, contract: ModelContract) -> Self {
        self.contract = Some(contract);
        self
    }

    pub(crate) fn into_page_model(self, page_key: &str) -> PageModel {
        PageModel {
            resource: self.resource.unwrap_or_else(|| page_key.to_string()),
            transform: self
                .transform
                .unwrap_or_else(|| Arc::new(|raw, _params| raw)),
            contract: self.contract,
        }
    }
}

/// Registers the six built-in hospital-administration pages.
///
/// Registration is last-write-wins, so callers may overwrite any of these
/// definitions afterwards.
pub async fn register_core_models(models: &ModelConnector) -> Result<()> {
    models
        .register_model(
            "Overview",
            ModelDefinition::new()
                .resource("core-dashboard")
                .transform(pages::overview::transform)
                .contract(pages::overview::contract()),
        )
        .await?;

    models
        .register_model(
            "Patients",
            ModelDefinition::new()
                .resource("patients")
                .transform(pages::patients::transform)
                .contract(pages::patients::contract()),
        )
        .await?;

    models
        .register_model(
            "Appointments",
            ModelDefinition::new()
                .resource("appointments")
                .transform(pages::appointments::transform)
                .contract(pages::appointments::contract()),
        )
        .await?;

    models
        .register_model(
            "Staff",
            ModelDefinition::new()
                .resource("staff")
                .transform(pages::staff::transform)
                .contract(pages::staff::contract()),
        )
        .await?;

    models
        .register_model(
            "Medications",
            ModelDefinition::new()
                .resource("medications")
                .transform(pages::medications::transform)
                .contract(pages::medications::contract()),
        )
        .await?;

    models
        .register_model(
            "Billing",
            ModelDefinition::new()
                .resource("billing")
                .transform(pages::billing::transform)
                .contract(pages::billing::contract()),
        )
        .await?;

    Ok(())
}
