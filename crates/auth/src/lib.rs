//! OIDC authentication for graphdesk.
//!
//! This crate provides:
//! - The OIDC sign-in flow against a discovered identity provider
//! - In-memory session storage
//! - Axum extractors for authentication

mod config;
mod error;
mod extractors;
pub mod flow;
mod providers;
mod sessions;
mod state;

pub use config::{AuthConfig, OidcConfig, CALLBACK_PATH};
pub use error::AuthError;
pub use extractors::{resolve_session, CurrentUser, OptionalUser, ResolvedSession};
pub use providers::OidcProvider;
pub use sessions::SessionStore;
pub use state::AuthState;
