use std::{env, time::Duration};

use graphdesk_client::client::DEFAULT_BASE_URL;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Graph endpoint (default: `https://graph.microsoft.com`)
    pub graph_base_url: String,
    /// Bound on every Graph request in seconds (default: 30)
    pub graph_timeout_seconds: u64,
    /// Expose failure details on error pages.
    pub development: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GRAPH_BASE_URL` - Graph endpoint (default: `https://graph.microsoft.com`)
    /// - `GRAPH_TIMEOUT_SECONDS` - Graph request timeout (default: 30)
    /// - `APP_ENV` - `development` shows upstream error bodies on error pages
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            graph_base_url: var("GRAPH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            graph_timeout_seconds: var("GRAPH_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
            development: var("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("development")),
        }
    }

    /// Get the Graph request timeout as a Duration.
    pub fn graph_timeout(&self) -> Duration {
        Duration::from_secs(self.graph_timeout_seconds)
    }
}
