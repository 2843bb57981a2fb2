//! Welcome mail with the user's profile photo.

use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use graphdesk_auth::CurrentUser;
use graphdesk_client::GraphApi;
use graphdesk_core::{
    failure::Failure,
    mail::{build_welcome_message, SharedPhoto},
    serde::deserialize_optional_string,
};
use serde::Deserialize;

use crate::{error::HandlerResult, extract::Form, render::HtmlTemplate, state::AppState};

#[derive(Template)]
#[template(path = "send_mail.html")]
struct SendMailTemplate {
    display_name: String,
    email: String,
    sent_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMailForm {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub default_email: Option<String>,
}

/// GET /sendMail - Compose page, prefilled with the user's own address.
///
/// The profile is fetched from Graph on every visit, so an expired access
/// token shows up here before the user tries to send anything.
pub async fn compose(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> HandlerResult {
    let profile = state.graph.get_user_profile(&principal.access_token).await?;

    let page = HtmlTemplate(SendMailTemplate {
        email: profile.primary_email().unwrap_or_default().to_string(),
        display_name: profile.display_name,
        sent_to: None,
    })
    .render()?;
    Ok(page.into_response())
}

/// POST /sendMail - Send the welcome mail and show the confirmation.
pub async fn send(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Form(form): Form<SendMailForm>,
) -> HandlerResult<Response> {
    let outcome = send_welcome_mail(
        state.graph.as_ref(),
        &principal.access_token,
        form.default_email,
    )
    .await?;

    let page = HtmlTemplate(SendMailTemplate {
        display_name: outcome.display_name,
        email: principal.profile.primary_email().unwrap_or_default().to_string(),
        sent_to: Some(outcome.recipient),
    })
    .render()?;
    Ok(page.into_response())
}

struct SentMail {
    display_name: String,
    recipient: String,
}

/// Fetch the profile and photo, share the photo from OneDrive and send the mail.
///
/// Without a recipient the mail goes to the user's own address. A user
/// without a profile photo gets the mail without attachment or link.
async fn send_welcome_mail(
    graph: &dyn GraphApi,
    token: &str,
    recipient: Option<String>,
) -> HandlerResult<SentMail> {
    let profile = graph.get_user_profile(token).await?;

    let recipient = recipient
        .or_else(|| profile.primary_email().map(str::to_string))
        .ok_or_else(|| Failure::message("No recipient address for the mail"))?;

    let photo = match graph.get_profile_photo(token).await? {
        Some(bytes) => {
            let uploaded = graph.upload_file(token, bytes.clone()).await?;
            let link = graph.get_sharing_link(token, &uploaded.id).await?;
            Some(SharedPhoto {
                bytes,
                sharing_link: link.web_url,
            })
        }
        None => None,
    };

    let request = build_welcome_message(&profile.display_name, &recipient, photo.as_ref());
    graph.send_mail(token, &request).await?;

    tracing::info!(
        %recipient,
        with_photo = photo.is_some(),
        "Welcome mail sent"
    );

    Ok(SentMail {
        display_name: profile.display_name,
        recipient,
    })
}
