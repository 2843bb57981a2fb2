//! Page and error rendering.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use graphdesk_core::failure::{ClassifiedFailure, Failure, FailureKind};

use crate::error::HandlerError;

/// Template wrapper that converts Askama templates into HTML responses.
///
/// Render failures surface as a [`HandlerError`] so they reach the error page
/// like any other handler failure.
pub struct HtmlTemplate<T>(pub T);

impl<T: Template> HtmlTemplate<T> {
    pub fn render(self) -> Result<Html<String>, HandlerError> {
        self.0
            .render()
            .map(Html)
            .map_err(|err| HandlerError(Failure::message(format!("Failed to render template: {err}"))))
    }
}

/// Everything the dispatcher can end a request with besides a handler response.
#[derive(Debug, Clone)]
pub enum RenderedError {
    /// A route guard declined the request.
    GuardDeclined { path: String },
    /// No route matches the verb and path.
    NotFound { path: String },
    /// The handler failed or panicked.
    Failure(ClassifiedFailure),
}

impl RenderedError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::GuardDeclined { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Failure(classified) => match classified.kind {
                FailureKind::TokenExpired => StatusCode::UNAUTHORIZED,
                FailureKind::Upstream => StatusCode::BAD_GATEWAY,
                FailureKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
                FailureKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Turns a dispatch error into the response sent to the client.
pub trait ErrorRenderer: Send + Sync {
    fn render(&self, error: RenderedError) -> Response;
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    title: &'static str,
    message: String,
    detail: Option<String>,
    sign_in: bool,
    sign_out: bool,
}

/// Renders the HTML error page.
#[derive(Debug, Clone, Default)]
pub struct HtmlErrorRenderer {
    /// Include the upstream response body on the page.
    pub expose_details: bool,
}

impl HtmlErrorRenderer {
    pub fn new(expose_details: bool) -> Self {
        Self { expose_details }
    }
}

impl ErrorRenderer for HtmlErrorRenderer {
    fn render(&self, error: RenderedError) -> Response {
        let status = error.status();

        let template = match &error {
            RenderedError::GuardDeclined { .. } => ErrorTemplate {
                title: "Sign in required",
                message: "You need to sign in to see this page.".to_string(),
                detail: None,
                sign_in: true,
                sign_out: false,
            },
            RenderedError::NotFound { path } => ErrorTemplate {
                title: "Not Found",
                message: format!("Nothing here at {path}."),
                detail: None,
                sign_in: false,
                sign_out: false,
            },
            RenderedError::Failure(classified) => ErrorTemplate {
                title: "Something went wrong",
                message: classified.enriched_message.clone(),
                detail: self.expose_details.then(|| classified.detail()).flatten(),
                sign_in: false,
                sign_out: classified.kind == FailureKind::TokenExpired,
            },
        };

        render_page(status, template)
    }
}

fn render_page(status: StatusCode, template: ErrorTemplate) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Failed to render error page");
            (status, template.message).into_response()
        }
    }
}
