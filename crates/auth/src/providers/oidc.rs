//! OIDC provider discovered from an issuer URL.

use async_trait::async_trait;
use graphdesk_core::auth::{AuthError, OidcClaims, OidcLogin, OidcProviderClient, Result};
use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointSet,
    IssuerUrl, Nonce, OAuth2TokenResponse, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};

use crate::config::OidcConfig;

/// Type alias for a CoreClient configured from provider metadata.
///
/// `from_provider_metadata` returns a client with:
/// - HasAuthUrl = EndpointSet (always set from discovery)
/// - HasDeviceAuthUrl = EndpointNotSet
/// - HasIntrospectionUrl = EndpointNotSet
/// - HasRevocationUrl = EndpointNotSet
/// - HasTokenUrl = EndpointMaybeSet (may or may not be in discovery)
/// - HasUserInfoUrl = EndpointMaybeSet (may or may not be in discovery)
///
/// Calling `set_redirect_uri` preserves these type parameters.
type ConfiguredCoreClient = CoreClient<
    EndpointSet,
    openidconnect::EndpointNotSet,
    openidconnect::EndpointNotSet,
    openidconnect::EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Identity provider reached through OIDC discovery.
pub struct OidcProvider {
    client: ConfiguredCoreClient,
    http_client: reqwest::Client,
    scopes: Vec<String>,
    validate_issuer: bool,
}

impl OidcProvider {
    /// Create a new provider by discovering the OIDC metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer URL is invalid
    /// - Discovery fails (network error or invalid metadata)
    /// - The redirect URI is invalid
    pub async fn discover(config: &OidcConfig) -> Result<Self> {
        let issuer_url = IssuerUrl::new(config.issuer_url.clone())
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        // Build HTTP client without redirect following (security requirement)
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let client = CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(config.client_id.clone()),
            config.client_secret.clone().map(ClientSecret::new),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.to_string())
                .map_err(|e| AuthError::Provider(e.to_string()))?,
        );

        tracing::info!(issuer = %config.issuer_url, "Discovered OIDC provider");

        Ok(Self {
            client,
            http_client,
            scopes: config.scopes.clone(),
            validate_issuer: config.validate_issuer,
        })
    }
}

#[async_trait]
impl OidcProviderClient for OidcProvider {
    async fn authorization_url(
        &self,
        state: &str,
        nonce: &str,
        pkce_challenge: &str,
    ) -> Result<String> {
        let state_owned = state.to_string();
        let nonce_owned = nonce.to_string();

        // `openid` is always requested by the authorization request itself.
        let scopes = self
            .scopes
            .iter()
            .filter(|s| s.as_str() != "openid")
            .map(|s| Scope::new(s.clone()));

        // The pkce_challenge parameter is the base64url-encoded SHA256 hash of the verifier.
        let (auth_url, _csrf_token, _nonce) = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state_owned),
                move || Nonce::new(nonce_owned),
            )
            .add_scopes(scopes)
            .add_extra_param("code_challenge", pkce_challenge.to_string())
            .add_extra_param("code_challenge_method", "S256")
            .url();

        Ok(auth_url.to_string())
    }

    async fn exchange_code(&self, code: &str, pkce_verifier: &str, nonce: &str) -> Result<OidcLogin> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthError::InvalidToken("No ID token in response".to_string()))?;

        let verifier = self
            .client
            .id_token_verifier()
            .require_issuer_match(self.validate_issuer);
        let expected_nonce = Nonce::new(nonce.to_string());

        let claims = id_token
            .claims(&verifier, &expected_nonce)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(OidcLogin {
            claims: OidcClaims {
                issuer: claims.issuer().url().to_string(),
                subject: claims.subject().to_string(),
                email: claims.email().map(|e| e.to_string()),
                preferred_username: claims.preferred_username().map(|u| u.to_string()),
                name: claims
                    .name()
                    .and_then(|n| n.get(None))
                    .map(|n| n.to_string()),
            },
            access_token: token_response.access_token().secret().to_string(),
            refresh_token: token_response
                .refresh_token()
                .map(|t| t.secret().to_string()),
        })
    }
}
