use graphdesk_core::failure::Failure;
use thiserror::Error;

/// Auth errors for the graphdesk_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// for I/O operations that can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (state, token parsing, storage, etc.)
    #[error(transparent)]
    Core(#[from] graphdesk_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider not configured
    #[error("identity provider is not configured")]
    ProviderNotConfigured,
}

impl From<AuthError> for Failure {
    fn from(err: AuthError) -> Self {
        Failure::Message(err.to_string())
    }
}
