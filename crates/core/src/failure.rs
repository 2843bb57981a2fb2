//! Request failures and their classification.
//!
//! Handlers fail with a [`Failure`]; the dispatcher classifies it exactly once
//! with [`classify`] before handing it to the error renderer.
//!
//! Expired credentials are recognised by shape only: a forbidden upstream
//! response whose code is `InvalidAuthenticationToken` and whose body carries
//! `error.message == "Access token has expired."`. Anything shaped differently
//! is never treated as an expired token, even when it is one.

use serde_json::Value;
use thiserror::Error;

/// Upstream error code Graph uses for rejected bearer tokens.
pub const INVALID_TOKEN_CODE: &str = "InvalidAuthenticationToken";

/// Upstream error message Graph uses for expired bearer tokens.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Access token has expired.";

/// Appended to the message of an expired-token failure.
pub const TOKEN_EXPIRED_SUFFIX: &str = " Expired token. Please sign out and sign in again.";

/// A raw failure raised while handling a request.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    /// Unstructured failure carrying only a message.
    #[error("{0}")]
    Message(String),

    /// Structured failure reported by the remote resource API.
    #[error("{0}")]
    Upstream(UpstreamFailure),

    /// The remote resource API did not answer in time.
    #[error("upstream request timed out: {0}")]
    Timeout(String),
}

impl Failure {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// Error details returned by the remote resource API.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamFailure {
    /// HTTP status of the upstream response.
    pub status: Option<u16>,
    /// Upstream error code (or status text when the body has none).
    pub message: String,
    /// Parsed upstream response body.
    pub response: Option<Value>,
}

impl UpstreamFailure {
    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }

    /// `error.message` of the upstream body, when present.
    pub fn inner_message(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .get("error")?
            .get("message")?
            .as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TokenExpired,
    Upstream,
    UpstreamTimeout,
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenExpired => "token_expired",
            Self::Upstream => "upstream",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure mapped to a [`FailureKind`] plus the message shown to the user.
#[derive(Debug, Clone)]
pub struct ClassifiedFailure {
    pub kind: FailureKind,
    pub original: Failure,
    pub enriched_message: String,
}

impl ClassifiedFailure {
    /// Upstream body rendered as pretty JSON, for development error pages.
    pub fn detail(&self) -> Option<String> {
        match &self.original {
            Failure::Upstream(upstream) => upstream
                .response
                .as_ref()
                .and_then(|body| serde_json::to_string_pretty(body).ok()),
            _ => None,
        }
    }
}

/// Classify a failure.
pub fn classify(failure: Failure) -> ClassifiedFailure {
    let message = failure.to_string();

    let kind = match &failure {
        Failure::Message(_) => FailureKind::Other,
        Failure::Timeout(_) => FailureKind::UpstreamTimeout,
        Failure::Upstream(upstream) if has_access_token_expired(upstream) => {
            FailureKind::TokenExpired
        }
        Failure::Upstream(upstream) if upstream.status.is_some() || upstream.response.is_some() => {
            FailureKind::Upstream
        }
        Failure::Upstream(_) => FailureKind::Other,
    };

    let enriched_message = match kind {
        FailureKind::TokenExpired => format!("{message}{TOKEN_EXPIRED_SUFFIX}"),
        _ => message,
    };

    ClassifiedFailure {
        kind,
        original: failure,
        enriched_message,
    }
}

fn has_access_token_expired(upstream: &UpstreamFailure) -> bool {
    upstream.is_forbidden()
        && upstream.message == INVALID_TOKEN_CODE
        && upstream.inner_message() == Some(TOKEN_EXPIRED_MESSAGE)
}
