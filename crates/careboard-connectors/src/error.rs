use careboard_backend::BackendError;
use careboard_models::ModelError;
use thiserror::Error;

/// Errors surfaced by the mutation connectors.
///
/// Validation failures are raised before any dispatcher call, so a
/// [`ConnectorError::MissingFields`] or [`ConnectorError::InvalidField`]
/// guarantees that no request left the process and no cache entry was
/// invalidated.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Missing fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("{message}")]
    InvalidField { message: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ConnectorError {
    pub fn missing_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingFields {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidField {
            message: message.into(),
        }
    }

    /// True when the error originated from payload validation rather than
    /// from the dispatcher or the loader.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. } | Self::InvalidField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = ConnectorError::missing_fields(["iid", "cin"]);
        assert_eq!(err.to_string(), "Missing fields: iid, cin");
        assert!(err.is_validation());
    }

    #[test]
    fn backend_errors_pass_through_verbatim() {
        let err: ConnectorError = BackendError::conflict("IID already exists").into();
        assert_eq!(err.to_string(), "IID already exists");
        assert!(!err.is_validation());
    }
}
