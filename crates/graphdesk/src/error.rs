use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use graphdesk_core::failure::Failure;

/// Error returned by request handlers.
///
/// Converts from anything that converts into a [`Failure`], so handlers can
/// use `?` on client and auth results. The response it produces is a marker
/// only: the failure boundary takes the [`Failure`] out of the response
/// extensions and renders the error page.
#[derive(Debug)]
pub struct HandlerError(pub Failure);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}

impl<E> From<E> for HandlerError
where
    E: Into<Failure>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Result type for request handlers.
pub type HandlerResult<T = Response> = Result<T, HandlerError>;
