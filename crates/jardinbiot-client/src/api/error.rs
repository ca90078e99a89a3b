use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request never produced a usable HTTP response (DNS, connect,
    /// timeout, TLS, aborted body).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("invalid response from server (status {status})")]
    Format { status: StatusCode },

    /// JSON did not match the expected shape, or a request body could not
    /// be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server rejected the request; message extracted from the error payload.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Structured validation rejection carrying a machine-readable `code`
    /// and the full payload for callers to branch on.
    #[error("validation failed (status {status})")]
    Validation { status: StatusCode, payload: Value },

    /// Credential storage backend failed.
    #[error("credential storage error: {0}")]
    Storage(anyhow::Error),
}

impl ApiError {
    /// HTTP status associated with the error, when one exists.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Network(e) => e.status(),
            ApiError::Format { status }
            | ApiError::Api { status, .. }
            | ApiError::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server answered 401 and the automatic refresh-and-retry
    /// could not recover the session. Callers should route to login.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Machine-readable code carried by a validation rejection.
    pub fn validation_code(&self) -> Option<&str> {
        match self {
            ApiError::Validation { payload, .. } => payload.get("code").and_then(Value::as_str),
            _ => None,
        }
    }
}
