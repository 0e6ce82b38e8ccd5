//! Loader behavior: cache purity, invalidation scope, contract
//! enforcement and concurrent-load semantics.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assert_json_diff::assert_json_eq;
use careboard_backend::BackendConnector;
use careboard_core::{Method, Params};
use careboard_models::{
    LoadOptions, ModelConnector, ModelContract, ModelDefinition, ModelError,
};
use serde_json::{Value, json};

fn params_of(entries: &[(&str, Value)]) -> Params {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

async fn wiring() -> (Arc<BackendConnector>, ModelConnector) {
    let backend = Arc::new(BackendConnector::new());
    let models = ModelConnector::new(Arc::clone(&backend));
    (backend, models)
}

/// Registers a counting resolver and a matching identity-transform model.
async fn register_counted_page(
    backend: &BackendConnector,
    models: &ModelConnector,
    page: &str,
    resource: &str,
    payload: Value,
) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    backend
        .register_fn(resource, Method::Get, move |_params, _body| {
            let counter = Arc::clone(&counter);
            let payload = payload.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(payload)
            }
        })
        .await
        .unwrap();
    models
        .register_model(page, ModelDefinition::new().resource(resource))
        .await
        .unwrap();
    calls
}

#[tokio::test]
async fn cache_hit_does_not_touch_the_dispatcher() {
    let (backend, models) = wiring().await;
    let calls = register_counted_page(
        &backend,
        &models,
        "Patients",
        "patients",
        json!({"patients": [{"iid": "1000"}]}),
    )
    .await;

    let first = models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    let second = models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_json_eq!(first, second);
}

#[tokio::test]
async fn force_refresh_bypasses_the_cache() {
    let (backend, models) = wiring().await;
    let calls =
        register_counted_page(&backend, &models, "Staff", "staff", json!({"staff": []})).await;

    models
        .load("Staff", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    models
        .load("Staff", Params::new(), LoadOptions::force())
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidation_covers_every_parameter_variant() {
    let (backend, models) = wiring().await;
    let calls =
        register_counted_page(&backend, &models, "Billing", "billing", json!({"kpis": []})).await;

    models
        .load(
            "Billing",
            params_of(&[("hospital_id", json!(1))]),
            LoadOptions::default(),
        )
        .await
        .unwrap();
    models
        .load(
            "Billing",
            params_of(&[("hospital_id", json!(2))]),
            LoadOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    models.clear_cache(Some("Billing")).await;

    models
        .load(
            "Billing",
            params_of(&[("hospital_id", json!(1))]),
            LoadOptions::default(),
        )
        .await
        .unwrap();
    models
        .load(
            "Billing",
            params_of(&[("hospital_id", json!(2))]),
            LoadOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn invalidation_is_scoped_to_the_page_key() {
    let (backend, models) = wiring().await;
    let patient_calls = register_counted_page(
        &backend,
        &models,
        "Patients",
        "patients",
        json!({"patients": []}),
    )
    .await;
    let staff_calls =
        register_counted_page(&backend, &models, "Staff", "staff", json!({"staff": []})).await;

    models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    models
        .load("Staff", Params::new(), LoadOptions::default())
        .await
        .unwrap();

    models.clear_cache(Some("Patients")).await;

    models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    models
        .load("Staff", Params::new(), LoadOptions::default())
        .await
        .unwrap();

    assert_eq!(patient_calls.load(Ordering::SeqCst), 2);
    assert_eq!(staff_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn contract_violation_rejects_and_caches_nothing() {
    let (backend, models) = wiring().await;
    backend
        .register_fn("patients", Method::Get, |_params, _body| async {
            Ok(json!({"unexpected": true}))
        })
        .await
        .unwrap();
    models
        .register_model(
            "Patients",
            ModelDefinition::new().resource("patients").contract(
                ModelContract::new()
                    .require("patients")
                    .validate("patients", Value::is_array),
            ),
        )
        .await
        .unwrap();

    let err = models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Model Patients missing keys: patients");
    assert_eq!(models.cache_len().await, 0);
}

#[tokio::test]
async fn failed_validator_rejects_the_load() {
    let (backend, models) = wiring().await;
    backend
        .register_fn("patients", Method::Get, |_params, _body| async {
            Ok(json!({"patients": "not-an-array"}))
        })
        .await
        .unwrap();
    models
        .register_model(
            "Patients",
            ModelDefinition::new().resource("patients").contract(
                ModelContract::new()
                    .require("patients")
                    .validate("patients", Value::is_array),
            ),
        )
        .await
        .unwrap();

    let err = models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Model Patients failed validator for patients"
    );
    assert_eq!(models.cache_len().await, 0);
}

#[tokio::test]
async fn missing_model_is_an_error() {
    let (_backend, models) = wiring().await;
    let err = models
        .load("Unknown", Params::new(), LoadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::ModelNotRegistered { .. }));
    assert_eq!(err.to_string(), "no model registered for Unknown");
}

#[tokio::test]
async fn identity_transform_returns_the_raw_payload() {
    let (backend, models) = wiring().await;
    backend
        .register_fn("patients", Method::Get, |_params, _body| async {
            Ok(json!({"patients": [{"iid": "1000"}], "lastSyncedAt": null}))
        })
        .await
        .unwrap();
    models
        .register_model(
            "Patients",
            ModelDefinition::new().resource("patients").contract(
                ModelContract::new()
                    .require("patients")
                    .validate("patients", Value::is_array),
            ),
        )
        .await
        .unwrap();

    let model = models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_json_eq!(
        model,
        json!({"patients": [{"iid": "1000"}], "lastSyncedAt": null})
    );
}

#[tokio::test]
async fn resolver_receives_the_merged_page_key() {
    let (backend, models) = wiring().await;
    backend
        .register_fn("staff", Method::Get, |params, _body| async move {
            Ok(json!({"sawPageKey": params.get("pageKey").cloned()}))
        })
        .await
        .unwrap();
    models
        .register_model("Staff", ModelDefinition::new().resource("staff"))
        .await
        .unwrap();

    let model = models
        .load("Staff", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(model["sawPageKey"], json!("Staff"));
}

#[tokio::test(start_paused = true)]
async fn concurrent_loads_are_not_deduplicated_and_the_later_wins() {
    let (backend, models) = wiring().await;

    // First dispatcher call answers slowly, second answers immediately, so
    // the first call's result lands in the cache last.
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    backend
        .register_fn("staff", Method::Get, move |_params, _body| {
            let counter = Arc::clone(&counter);
            async move {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                if call == 0 {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(json!({"staff": [], "origin": "slow"}))
                } else {
                    Ok(json!({"staff": [], "origin": "fast"}))
                }
            }
        })
        .await
        .unwrap();
    models
        .register_model("Staff", ModelDefinition::new().resource("staff"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        models.load("Staff", Params::new(), LoadOptions::default()),
        models.load("Staff", Params::new(), LoadOptions::default()),
    );
    assert_eq!(first.unwrap()["origin"], json!("slow"));
    assert_eq!(second.unwrap()["origin"], json!("fast"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // The slow call completed last; its value owns the cache slot.
    let cached = models
        .load("Staff", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(cached["origin"], json!("slow"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn core_models_register_all_pages() {
    let (_backend, models) = wiring().await;
    careboard_models::register_core_models(&models).await.unwrap();
    assert_eq!(
        models.pages().await,
        vec![
            "Appointments",
            "Billing",
            "Medications",
            "Overview",
            "Patients",
            "Staff"
        ]
    );
}
