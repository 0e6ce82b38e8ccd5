use std::fs;
use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use careboard_connectors::{
    AppointmentConnector, BillingConnector, MedicationsConnector, PatientConnector, StaffConnector,
};
use careboard_core::Params;
use careboard_models::{LoadOptions, ModelConnector};
use serde_json::Value;

use crate::cli::{CreateArgs, CreateDomain, LoadArgs, OutputFormat};
use crate::output;
use crate::wiring::Stack;

pub async fn pages(models: &ModelConnector) -> Result<()> {
    let pairs = models.page_resources().await;
    output::print_pages(&pairs);
    Ok(())
}

pub async fn load(models: &ModelConnector, args: &LoadArgs, format: OutputFormat) -> Result<()> {
    let params = parse_params(&args.params)?;
    let options = if args.force {
        LoadOptions::force()
    } else {
        LoadOptions::default()
    };
    let model = models.load(&args.page, params, options).await?;
    output::print_value(&model, format);
    Ok(())
}

pub async fn invalidate(models: &ModelConnector, page: Option<&str>) -> Result<()> {
    models.clear_cache(page).await;
    match page {
        Some(page) => output::print_success(&format!("Dropped cached models for {page}")),
        None => output::print_success("Dropped the entire model cache"),
    }
    Ok(())
}

pub async fn create(stack: &Stack, args: &CreateArgs, format: OutputFormat) -> Result<()> {
    let payload = read_payload(args.file.as_deref())?;
    let backend = Arc::clone(&stack.backend);
    let models = Arc::clone(&stack.models);

    let response = match args.domain {
        CreateDomain::Patient => {
            PatientConnector::new(backend, models)
                .add_patient(payload)
                .await?
        }
        CreateDomain::Staff => {
            StaffConnector::new(backend, models)
                .add_staff(payload)
                .await?
        }
        CreateDomain::Appointment => {
            AppointmentConnector::new(backend, models)
                .add_appointment(payload)
                .await?
        }
        CreateDomain::Medication => {
            MedicationsConnector::new(backend, models)
                .add_medication(payload)
                .await?
        }
        CreateDomain::Stock => {
            MedicationsConnector::new(backend, models)
                .add_stock_entry(payload)
                .await?
        }
        CreateDomain::Expense => {
            BillingConnector::new(backend, models)
                .create_expense(payload)
                .await?
        }
    };
    output::print_value(&response, format);
    Ok(())
}

/// `key=value` pairs; values parse as JSON when they can, strings
/// otherwise, so `hospital_id=3` is a number and `city=Rabat` a string.
fn parse_params(raw: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{pair}': expected key=value");
        };
        let parsed = serde_json::from_str(value).unwrap_or(Value::String(value.to_string()));
        params.insert(key.to_string(), parsed);
    }
    Ok(params)
}

fn read_payload(file: Option<&str>) -> Result<Value> {
    let content = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Cannot read file: {path}"))?
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Cannot read payload from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&content).context("Payload is not valid JSON")
}
