//! Landing and sign-in pages.

use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use graphdesk_auth::OptionalUser;

use crate::{error::HandlerResult, render::HtmlTemplate, state::AppState};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    sign_in_enabled: bool,
}

/// GET / - Send signed-in users to the mail page and everyone else to sign in.
pub async fn index(OptionalUser(user): OptionalUser) -> Redirect {
    match user {
        Some(_) => Redirect::to("/sendMail"),
        None => Redirect::to("/login-page"),
    }
}

/// GET /login-page - Sign-in page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> HandlerResult {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let page = HtmlTemplate(LoginTemplate {
        sign_in_enabled: state.auth.provider().is_ok(),
    })
    .render()?;
    Ok(page.into_response())
}
