//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
};
use axum_extra::extract::CookieJar;
use graphdesk_core::auth::{Principal, SessionId};

use crate::error::AuthError;
use crate::AuthState;

/// A session resolved from the request cookie.
///
/// Request guards insert it into the request extensions so handlers reuse the
/// principal captured at guard time instead of looking the session up again.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub session_id: SessionId,
    pub principal: Principal,
}

/// Resolve the caller's session from the session cookie.
///
/// Returns `Ok(None)` when there is no cookie or the session is unknown.
pub async fn resolve_session(
    headers: &HeaderMap,
    auth: &AuthState,
) -> Result<Option<ResolvedSession>, AuthError> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(&auth.config.cookie_name) else {
        return Ok(None);
    };

    let session_id = SessionId::new(cookie.value().to_string());
    let principal = auth.sessions.get_session(&session_id).await?;

    Ok(principal.map(|principal| ResolvedSession {
        session_id,
        principal,
    }))
}

async fn session_from_parts(parts: &Parts, auth: &AuthState) -> Option<ResolvedSession> {
    if let Some(resolved) = parts.extensions.get::<ResolvedSession>() {
        return Some(resolved.clone());
    }

    match resolve_session(&parts.headers, auth).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            None
        }
    }
}

/// Extractor for authenticated user. Returns 401 if not authenticated.
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        session_from_parts(parts, &auth_state)
            .await
            .map(|resolved| CurrentUser(resolved.principal))
            .ok_or((StatusCode::UNAUTHORIZED, "Session not found"))
    }
}

/// Extractor for optionally authenticated user. Returns None if not authenticated.
pub struct OptionalUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let resolved = session_from_parts(parts, &auth_state).await;
        Ok(OptionalUser(resolved.map(|r| r.principal)))
    }
}
