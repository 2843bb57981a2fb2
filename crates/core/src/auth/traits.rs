use async_trait::async_trait;

use super::{AuthError, AuthFlowState, OidcLogin, Principal, SessionId};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over the OIDC identity provider.
#[async_trait]
pub trait OidcProviderClient: Send + Sync {
    /// Generate the authorization URL the browser is redirected to.
    async fn authorization_url(&self, state: &str, nonce: &str, pkce_challenge: &str)
        -> Result<String>;

    /// Exchange an authorization code for verified claims and API tokens.
    async fn exchange_code(&self, code: &str, pkce_verifier: &str, nonce: &str)
        -> Result<OidcLogin>;
}

/// Session storage abstraction.
///
/// Maps an opaque [`SessionId`] to the [`Principal`] that logged in with it.
/// Entries have no expiry: they live until `delete_session` or process exit.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a principal under a freshly allocated session ID.
    async fn create_session(&self, principal: Principal) -> Result<SessionId>;

    /// Retrieve the principal for a session ID.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Principal>>;

    /// Delete a session. Deleting an unknown ID is not an error.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;

    /// Store PKCE/nonce data for an in-flight login, keyed by CSRF state.
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()>;

    /// Retrieve and delete auth flow state.
    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>>;
}
