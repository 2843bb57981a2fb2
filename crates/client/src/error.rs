//! Client error types.

use graphdesk_core::failure::{Failure, UpstreamFailure};
use serde_json::Value;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Graph answered with a non-success status.
    #[error("Graph returned {status} {code}: {message}")]
    Upstream {
        status: u16,
        code: String,
        message: String,
        body: Option<Value>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for Failure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Upstream {
                status, code, body, ..
            } => Failure::Upstream(UpstreamFailure {
                status: Some(status),
                message: code,
                response: body,
            }),
            ClientError::Request(e) if e.is_timeout() => Failure::Timeout(e.to_string()),
            ClientError::Request(e) => match e.status() {
                Some(status) => Failure::Upstream(UpstreamFailure {
                    status: Some(status.as_u16()),
                    message: status.canonical_reason().unwrap_or("Upstream error").to_string(),
                    response: None,
                }),
                None => Failure::Message(e.to_string()),
            },
            other => Failure::Message(other.to_string()),
        }
    }
}
