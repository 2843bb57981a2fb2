//! Sign-in and sign-out steps shared by the HTTP handlers.
//!
//! The callback in [`complete_login`] is the only place a `Principal` is created.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use graphdesk_core::auth::{generate_state, principal_from_login, AuthFlowState, SessionId};
use openidconnect::PkceCodeChallenge;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::AuthState;

/// Start a sign-in: remember PKCE verifier and nonce under a fresh CSRF
/// state and return the provider URL the browser must visit.
pub async fn begin_login(state: &AuthState) -> Result<String, AuthError> {
    let provider = state.provider()?;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = generate_state();

    let flow = AuthFlowState {
        pkce_verifier: pkce_verifier.secret().to_string(),
        nonce: generate_state(),
        created_at: Utc::now(),
    };
    state.sessions.store_auth_flow(&csrf_state, &flow).await?;

    let url = provider
        .authorization_url(&csrf_state, &flow.nonce, pkce_challenge.as_str())
        .await?;

    Ok(url)
}

/// Finish a sign-in: consume the flow for `csrf_state`, exchange the code
/// and store the resulting principal under a new session.
///
/// Unknown, replayed and expired flows are rejected with `InvalidState`.
pub async fn complete_login(
    state: &AuthState,
    code: &str,
    csrf_state: &str,
) -> Result<SessionId, AuthError> {
    let flow = state
        .sessions
        .take_auth_flow(csrf_state)
        .await?
        .filter(|flow| !flow.is_expired(Utc::now()))
        .ok_or(AuthError::Core(graphdesk_core::auth::AuthError::InvalidState))?;

    let login = state
        .provider()?
        .exchange_code(code, &flow.pkce_verifier, &flow.nonce)
        .await?;

    let issuer = login.claims.issuer.clone();
    let subject = login.claims.subject.clone();
    let principal = principal_from_login(login)?;

    let session_id = state.sessions.create_session(principal).await?;
    tracing::info!(%issuer, %subject, "User signed in");

    Ok(session_id)
}

/// Destroy a session. Unknown sessions are ignored.
pub async fn end_session(state: &AuthState, session_id: &SessionId) -> Result<(), AuthError> {
    state.sessions.delete_session(session_id).await?;
    Ok(())
}

/// Cookie carrying the session ID.
pub fn session_cookie(config: &AuthConfig, session_id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie to pass to `CookieJar::remove` to clear the session ID.
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone()).path("/").build()
}
