//! Error taxonomy for calls against the action service.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by the action service or while talking to it.
///
/// Callers above this layer propagate these unchanged; no variant is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("unauthorized ({status}): {message}. Hint: set ACTIONCTL_AUTH_TOKEN=...")]
    Unauthorized { status: u16, message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Map a non-success HTTP response onto the error taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_fault_message(body);
        match status.as_u16() {
            404 => Self::NotFound { message },
            400 | 422 => Self::Validation { message },
            409 => Self::Conflict { message },
            401 | 403 => Self::Unauthorized {
                status: status.as_u16(),
                message,
            },
            other => Self::Server { status: other, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error.to_string())
    }
}

/// Prefer the service's `faultstring` field; fall back to the trimmed body.
fn extract_fault_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("faultstring").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "<empty response>".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
