//! Error types for provider operations

use crate::diag::{Diagnostic, Diagnostics};
use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// An RPC failed
    #[error("Unable to {action}, got error: {status}")]
    Client {
        action: String,
        #[source]
        status: tonic::Status,
    },

    /// An RPC succeeded but carried no usable payload
    #[error("{0}")]
    EmptyResponse(String),

    /// The remote record does not exist
    #[error("{0}")]
    NotFound(String),

    /// A declarative value could not be mapped to or from the wire format
    #[error("Unable to convert {field}: {reason}")]
    Conversion { field: String, reason: String },

    /// Provider settings are unknown or missing
    #[error("invalid provider configuration:\n{0}")]
    Configuration(Diagnostics),

    /// Resource configuration failed schema validation
    #[error("invalid resource configuration:\n{0}")]
    Validation(Diagnostics),

    /// The gRPC channel could not be built
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Invalid endpoint URL
    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No resource registered under this type name
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    /// State or plan data did not match the resource model
    #[error("unable to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    pub fn client(action: impl Into<String>, status: tonic::Status) -> Self {
        Self::Client {
            action: action.into(),
            status,
        }
    }

    pub fn conversion(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::Conversion {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }

    /// Whether the failure came back from the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Client { .. } | Self::EmptyResponse(_) | Self::NotFound(_)
        )
    }

    /// Renders the error the way it is reported to the user.
    pub fn to_diagnostics(&self) -> Diagnostics {
        match self {
            Self::Client { .. } | Self::EmptyResponse(_) | Self::NotFound(_) => {
                Diagnostic::error("Client Error", self.to_string()).into()
            }
            Self::Conversion { .. } => Diagnostic::error("Conversion Error", self.to_string()).into(),
            Self::Configuration(diags) | Self::Validation(diags) => diags.clone(),
            Self::Transport(_) | Self::InvalidUrl { .. } => Diagnostic::error(
                "Unable to Create Devzero API Client",
                format!(
                    "An unexpected error occurred when creating the Devzero API client: {self}"
                ),
            )
            .into(),
            Self::UnknownResource(_) => {
                Diagnostic::error("Unknown Resource Type", self.to_string()).into()
            }
            Self::Decode { .. } => Diagnostic::error("Invalid State", self.to_string()).into(),
        }
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_message() {
        let err = ProviderError::client(
            "create cluster",
            tonic::Status::unavailable("connection refused"),
        );
        let diags = err.to_diagnostics();
        let diag = diags.iter().next().unwrap();

        assert_eq!(diag.summary, "Client Error");
        assert!(diag.detail.starts_with("Unable to create cluster, got error: "));
        assert!(diag.detail.contains("connection refused"));
        assert!(err.is_remote());
    }

    #[test]
    fn test_conversion_error_is_not_remote() {
        let err = ProviderError::conversion("kind filter", "invalid kind: Foo");
        assert_eq!(err.to_string(), "Unable to convert kind filter: invalid kind: Foo");
        assert!(!err.is_remote());
        assert_eq!(
            err.to_diagnostics().iter().next().unwrap().summary,
            "Conversion Error"
        );
    }
}
