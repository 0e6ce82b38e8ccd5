//! Post-transform shape validation for page view models.

use serde_json::Value;

use crate::error::{ModelError, Result};

/// A per-key check applied to a view model field when the field is present.
pub type Validator = fn(&Value) -> bool;

/// The shape a page's view model must satisfy before it is cached or
/// returned.
///
/// Required keys must be present on the object; validators run only for
/// keys that are present. A violation fails the whole load.
#[derive(Debug, Clone, Default)]
pub struct ModelContract {
    required_keys: Vec<String>,
    validators: Vec<(String, Validator)>,
}

impl ModelContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as required.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        self.required_keys.push(key.into());
        self
    }

    /// Attaches a validator to a key; it runs whenever the key is present.
    pub fn validate(mut self, key: impl Into<String>, validator: Validator) -> Self {
        self.validators.push((key.into(), validator));
        self
    }

    /// Checks `payload` against this contract.
    ///
    /// # Errors
    ///
    /// [`ModelError::MissingKeys`] when required keys are absent,
    /// [`ModelError::ValidatorFailed`] for the first failing validator.
    pub fn check(&self, page_key: &str, payload: &Value) -> Result<()> {
        let fields = payload.as_object();

        let missing: Vec<String> = self
            .required_keys
            .iter()
            .filter(|key| !fields.is_some_and(|obj| obj.contains_key(key.as_str())))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::MissingKeys {
                page: page_key.to_string(),
                keys: missing,
            });
        }

        for (key, validator) in &self.validators {
            if let Some(value) = fields.and_then(|obj| obj.get(key.as_str()))
                && !validator(value)
            {
                return Err(ModelError::ValidatorFailed {
                    page: page_key.to_string(),
                    key: key.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Accepts `null` or a string; used for optional `lastSyncedAt` fields.
pub fn nullable_string(value: &Value) -> bool {
    value.is_null() || value.is_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract() -> ModelContract {
        ModelContract::new()
            .require("patients")
            .validate("patients", Value::is_array)
            .validate("lastSyncedAt", nullable_string)
    }

    #[test]
    fn test_valid_payload_passes() {
        let payload = json!({"patients": [], "lastSyncedAt": null});
        assert!(contract().check("Patients", &payload).is_ok());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let err = contract()
            .check("Patients", &json!({"lastSyncedAt": null}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Model Patients missing keys: patients");
    }

    #[test]
    fn test_present_key_must_satisfy_validator() {
        let err = contract()
            .check("Patients", &json!({"patients": "nope"}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model Patients failed validator for patients"
        );
    }

    #[test]
    fn test_absent_optional_key_is_not_validated() {
        let payload = json!({"patients": []});
        assert!(contract().check("Patients", &payload).is_ok());
    }

    #[test]
    fn test_non_object_payload_misses_everything() {
        let err = contract().check("Patients", &json!(42)).unwrap_err();
        assert!(matches!(err, ModelError::MissingKeys { .. }));
    }
}
