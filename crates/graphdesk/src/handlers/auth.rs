//! Sign-in, OIDC callback and sign-out.

use axum::{extract::State, response::Redirect, Extension};
use axum_extra::extract::CookieJar;
use graphdesk_auth::{flow, ResolvedSession};
use graphdesk_core::failure::Failure;
use serde::Deserialize;

use crate::{
    error::HandlerResult,
    extract::{Form, Query},
    state::AppState,
};

/// Parameters the identity provider sends back to the redirect URI.
///
/// The provider either answers with `code` and `state`, or with `error` and
/// an optional `error_description`.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /login - Redirect to the identity provider.
pub async fn login(State(state): State<AppState>) -> HandlerResult<Redirect> {
    let url = flow::begin_login(&state.auth).await?;
    Ok(Redirect::to(&url))
}

/// GET /token - OIDC callback (query response mode).
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> HandlerResult<(CookieJar, Redirect)> {
    handle_callback(&state, jar, params).await
}

/// POST /token - OIDC callback (`form_post` response mode).
pub async fn callback_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(params): Form<CallbackParams>,
) -> HandlerResult<(CookieJar, Redirect)> {
    handle_callback(&state, jar, params).await
}

async fn handle_callback(
    state: &AppState,
    jar: CookieJar,
    params: CallbackParams,
) -> HandlerResult<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or_default();
        tracing::warn!(%error, %description, "Identity provider returned an error");
        return Err(Failure::message(format!("Sign-in failed: {error} {description}").trim_end()).into());
    }

    let (Some(code), Some(csrf_state)) = (params.code, params.state) else {
        return Err(Failure::message("Sign-in callback is missing the code or state").into());
    };

    let session_id = flow::complete_login(&state.auth, &code, &csrf_state).await?;
    let cookie = flow::session_cookie(&state.auth.config, &session_id);

    Ok((jar.add(cookie), Redirect::to("/")))
}

/// GET /disconnect - Destroy the session and clear the cookie.
pub async fn disconnect(
    State(state): State<AppState>,
    Extension(session): Extension<ResolvedSession>,
    jar: CookieJar,
) -> HandlerResult<(CookieJar, Redirect)> {
    flow::end_session(&state.auth, &session.session_id).await?;
    let jar = jar.remove(flow::removal_cookie(&state.auth.config));
    Ok((jar, Redirect::to("/")))
}
