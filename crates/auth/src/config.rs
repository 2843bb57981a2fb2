use url::Url;

use crate::error::AuthError;

/// Path the identity provider redirects back to after sign-in.
pub const CALLBACK_PATH: &str = "/token";

const DEFAULT_SCOPES: &str = "openid profile email offline_access User.Read Mail.Send Files.ReadWrite";

/// Configuration for the OIDC identity provider.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Issuer URL used for discovery (`{issuer}/.well-known/openid-configuration`).
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Url,
    pub scopes: Vec<String>,
    /// Whether ID tokens must carry the discovered issuer.
    pub validate_issuer: bool,
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub oidc: Option<OidcConfig>,
    pub base_url: Url,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_BASE_URL`: Base URL for callback redirects (default: `http://localhost:3000`)
    /// - `OIDC_ISSUER_URL`: Issuer URL (optional, enables sign-in)
    /// - `OIDC_CLIENT_ID`: OAuth client ID (required if sign-in enabled)
    /// - `OIDC_CLIENT_SECRET`: OAuth client secret (optional, public clients omit it)
    /// - `OIDC_SCOPES`: Space separated scopes (default covers profile, mail and files)
    /// - `OIDC_VALIDATE_ISSUER`: Whether to check the ID token issuer (default: true)
    /// - `COOKIE_NAME`: Session cookie name (default: `graphdesk_session`)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: true)
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the provider is partially configured.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let base_url: Url = var("AUTH_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .parse()
            .map_err(|e| AuthError::Config(format!("AUTH_BASE_URL must be a valid URL: {e}")))?;

        let oidc = match var("OIDC_ISSUER_URL") {
            Some(issuer_url) => Some(OidcConfig {
                issuer_url,
                client_id: var("OIDC_CLIENT_ID").ok_or_else(|| {
                    AuthError::Config("OIDC_CLIENT_ID is required with OIDC_ISSUER_URL".to_string())
                })?,
                client_secret: var("OIDC_CLIENT_SECRET"),
                redirect_uri: base_url
                    .join(CALLBACK_PATH)
                    .map_err(|e| AuthError::Config(e.to_string()))?,
                scopes: var("OIDC_SCOPES")
                    .unwrap_or_else(|| DEFAULT_SCOPES.to_string())
                    .split_whitespace()
                    .map(String::from)
                    .collect(),
                validate_issuer: var("OIDC_VALIDATE_ISSUER")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(true),
            }),
            None => None,
        };

        let cookie_secure = var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(Self {
            oidc,
            base_url,
            cookie_name: var("COOKIE_NAME").unwrap_or_else(|| "graphdesk_session".to_string()),
            cookie_secure,
        })
    }
}
