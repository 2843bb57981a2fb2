//! HTTP client for Microsoft Graph.

pub mod drives;
pub mod me;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Public Graph endpoint.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com";

/// HTTP client for the Graph API.
///
/// Every request carries the caller's bearer token and is bounded by the
/// timeout given at construction.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Create a new client with the given base URL and request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, token: &str, url: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%url, "GET");
        self.client.get(url).bearer_auth(token)
    }

    /// Deserialize a success body or turn the Graph error envelope into an error.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;
        response.json().await.map_err(ClientError::from)
    }

    /// Pass success responses through, map everything else to [`ClientError::Upstream`].
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(
                    status = status.as_u16(),
                    error = %err,
                    "Failed to read error body"
                );
                String::new()
            }
        };
        let body = serde_json::from_str::<Value>(&text).ok();
        let envelope = body.as_ref().and_then(|b| b.get("error"));
        let field = |name: &str| {
            envelope
                .and_then(|e| e.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let reason = status.canonical_reason().unwrap_or("Unknown error");
        let code = field("code").unwrap_or_else(|| reason.to_string());
        let message = field("message").unwrap_or(if text.is_empty() {
            reason.to_string()
        } else {
            text
        });

        tracing::warn!(status = status.as_u16(), %code, "Graph request failed");

        Err(ClientError::Upstream {
            status: status.as_u16(),
            code,
            message,
            body,
        })
    }
}
