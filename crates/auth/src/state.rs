//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use graphdesk_core::auth::{OidcProviderClient, SessionRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::providers::OidcProvider;

/// Shared state for authentication.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionRepository>,
    pub config: AuthConfig,
    provider: Option<Arc<dyn OidcProviderClient>>,
}

impl AuthState {
    /// Creates a new AuthState, discovering the identity provider when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if provider initialization fails (e.g., OIDC discovery).
    pub async fn new(
        sessions: Arc<dyn SessionRepository>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let provider = match config.oidc {
            Some(ref cfg) => {
                Some(Arc::new(OidcProvider::discover(cfg).await?) as Arc<dyn OidcProviderClient>)
            }
            None => {
                tracing::warn!("No identity provider configured, sign-in is disabled");
                None
            }
        };

        Ok(Self {
            sessions,
            config,
            provider,
        })
    }

    /// Creates an AuthState around an already constructed provider client.
    pub fn with_provider(
        sessions: Arc<dyn SessionRepository>,
        config: AuthConfig,
        provider: Option<Arc<dyn OidcProviderClient>>,
    ) -> Self {
        Self {
            sessions,
            config,
            provider,
        }
    }

    /// Gets the identity provider client.
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotConfigured` if sign-in is not enabled.
    pub fn provider(&self) -> Result<&dyn OidcProviderClient, AuthError> {
        self.provider
            .as_deref()
            .ok_or(AuthError::ProviderNotConfigured)
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
