//! OIDC provider implementations.

mod oidc;

pub use oidc::OidcProvider;
