//! Mutation flow: validation gates the dispatcher, success invalidates
//! the affected pages, failure leaves the cache alone.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_json_diff::assert_json_eq;
use careboard_backend::{BackendConnector, BackendError};
use careboard_connectors::{
    BillingConnector, BillingFilters, InsuranceScope, MedicationsConnector, PatientConnector,
};
use careboard_core::{Method, Params};
use careboard_models::{LoadOptions, ModelConnector, ModelDefinition};
use serde_json::{Value, json};

async fn wiring() -> (Arc<BackendConnector>, Arc<ModelConnector>) {
    let backend = Arc::new(BackendConnector::new());
    let models = Arc::new(ModelConnector::new(Arc::clone(&backend)));
    (backend, models)
}

/// Registers a counting GET resolver plus an identity model for a page,
/// and a counting POST resolver for the mutation resource.
async fn register_domain(
    backend: &BackendConnector,
    models: &ModelConnector,
    page: &str,
    read_resource: &str,
    write_resource: &str,
) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&reads);
    backend
        .register_fn(read_resource, Method::Get, move |_params, _body| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"items": []}))
            }
        })
        .await
        .unwrap();

    let counter = Arc::clone(&writes);
    backend
        .register_fn(write_resource, Method::Post, move |_params, body| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(body.unwrap_or(Value::Null))
            }
        })
        .await
        .unwrap();

    models
        .register_model(page, ModelDefinition::new().resource(read_resource))
        .await
        .unwrap();

    (reads, writes)
}

#[tokio::test]
async fn invalid_medication_never_reaches_the_dispatcher() {
    let (backend, models) = wiring().await;
    let (reads, writes) =
        register_domain(&backend, &models, "Medications", "medications", "medications").await;

    models
        .load("Medications", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    let connector = MedicationsConnector::new(Arc::clone(&backend), Arc::clone(&models));
    let err = connector
        .add_medication(json!({
            "id": "MED-204",
            "name": "Amoxicillin 500mg",
            "hospital": "Rabat Central",
            "qty": 12,
            "unit": "boxes",
            "class": "Antibiotic"
        }))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing fields: reorderLevel");
    assert_eq!(writes.load(Ordering::SeqCst), 0);

    // Cache entry survives the rejected mutation.
    models
        .load("Medications", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_admission_invalidates_the_patients_page() {
    let (backend, models) = wiring().await;
    let (reads, writes) =
        register_domain(&backend, &models, "Patients", "patients", "patients").await;

    models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();

    let connector = PatientConnector::new(Arc::clone(&backend), Arc::clone(&models));
    let response = connector
        .add_patient(json!({
            "iid": "1203",
            "cin": "ab1234",
            "name": "Imane Berrada",
            "sex": "F"
        }))
        .await
        .unwrap();
    assert_eq!(writes.load(Ordering::SeqCst), 1);
    // The dispatcher sees the normalized payload: parsed IID, uppercased CIN.
    assert_json_eq!(
        response,
        json!({
            "iid": 1203,
            "cin": "AB1234",
            "name": "Imane Berrada",
            "sex": "F"
        })
    );

    // The next load is a miss again.
    models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_post_does_not_invalidate() {
    let (backend, models) = wiring().await;
    let (reads, _writes) =
        register_domain(&backend, &models, "Patients", "patients", "unused").await;

    backend
        .register_fn("patients", Method::Post, |_params, _body| async {
            Err(BackendError::conflict("IID already exists"))
        })
        .await
        .unwrap();

    models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();

    let connector = PatientConnector::new(Arc::clone(&backend), Arc::clone(&models));
    let err = connector
        .add_patient(json!({
            "iid": 1203,
            "cin": "AB1234",
            "name": "Imane Berrada",
            "sex": "F"
        }))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "IID already exists");

    models
        .load("Patients", Params::new(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn billing_filters_cache_independently() {
    let (backend, models) = wiring().await;
    let (reads, _writes) = register_domain(&backend, &models, "Billing", "billing", "unused").await;

    let connector = BillingConnector::new(Arc::clone(&backend), Arc::clone(&models));

    let scoped = BillingFilters {
        hospital_id: Some(3),
        insurance: InsuranceScope::SelfPay,
        ..Default::default()
    };
    connector
        .load_dashboard(&scoped, LoadOptions::default())
        .await
        .unwrap();
    connector
        .load_dashboard(&BillingFilters::default(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    // Repeat loads of either variant hit the cache.
    connector
        .load_dashboard(&scoped, LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expense_creation_invalidates_every_billing_variant() {
    let (backend, models) = wiring().await;
    let (reads, writes) =
        register_domain(&backend, &models, "Billing", "billing", "billing/expense").await;

    let connector = BillingConnector::new(Arc::clone(&backend), Arc::clone(&models));

    let scoped = BillingFilters {
        insurance: InsuranceScope::Insurer(2),
        days_back: Some(30),
        ..Default::default()
    };
    connector
        .load_dashboard(&scoped, LoadOptions::default())
        .await
        .unwrap();
    connector
        .load_dashboard(&BillingFilters::default(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    connector
        .create_expense(json!({ "caid": 9104, "total": 410.25 }))
        .await
        .unwrap();
    assert_eq!(writes.load(Ordering::SeqCst), 1);

    connector
        .load_dashboard(&scoped, LoadOptions::default())
        .await
        .unwrap();
    connector
        .load_dashboard(&BillingFilters::default(), LoadOptions::default())
        .await
        .unwrap();
    assert_eq!(reads.load(Ordering::SeqCst), 4);
}
