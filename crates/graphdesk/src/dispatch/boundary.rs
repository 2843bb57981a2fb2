use std::{any::Any, panic::AssertUnwindSafe};

use axum::{
    extract::{Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use graphdesk_core::failure::{classify, Failure};

use crate::{render::RenderedError, state::AppState};

/// Run the handler and turn its failure or panic into the error page.
///
/// Handler failures arrive as a [`Failure`] in the response extensions (see
/// [`HandlerError`](crate::error::HandlerError)). Responses without one pass
/// through untouched.
pub async fn failure_boundary(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let failure = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(mut response) => match response.extensions_mut().remove::<Failure>() {
            Some(failure) => failure,
            None => return response,
        },
        Err(payload) => Failure::Message(panic_message(payload.as_ref())),
    };

    render_failure(&state, failure, &method, &path)
}

/// Classify a failure, log it and render it.
pub fn render_failure(state: &AppState, failure: Failure, method: &Method, path: &str) -> Response {
    let classified = classify(failure);
    tracing::error!(
        kind = %classified.kind,
        %method,
        path,
        message = %classified.enriched_message,
        "Request failed"
    );
    state.renderer.render(RenderedError::Failure(classified))
}

/// Fallback for requests no route matches.
pub async fn not_found(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = uri.path().to_string();
    tracing::warn!(%method, %path, "No route matches request");
    state.renderer.render(RenderedError::NotFound { path })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("Handler panicked: {detail}")
}
