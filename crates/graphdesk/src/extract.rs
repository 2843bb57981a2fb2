//! Request extractors whose rejections go through the error page.
//!
//! axum's own `Form`, `Query` and `Path` answer a bad request with a bare
//! text response. These wrappers turn the rejection into a [`HandlerError`]
//! so the failure boundary renders it like any other handler failure.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use graphdesk_core::failure::Failure;

use crate::error::HandlerError;

/// Form body, `application/x-www-form-urlencoded` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Form<T>(pub T);

/// Query string parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

/// Path segments captured by the route.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

fn rejected(source: &str, status: u16, body: String) -> HandlerError {
    tracing::debug!(source, status, %body, "Request extractor rejected input");
    HandlerError(Failure::message(format!("Invalid {source}: {body}")))
}

impl<T, S> FromRequest<S> for Form<T>
where
    axum::Form<T>: FromRequest<S, Rejection = axum::extract::rejection::FormRejection>,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Form::<T>::from_request(req, state).await {
            Ok(axum::Form(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejected(
                "form",
                rejection.status().as_u16(),
                rejection.body_text(),
            )),
        }
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    axum::extract::Query<T>:
        FromRequestParts<S, Rejection = axum::extract::rejection::QueryRejection>,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejected(
                "query string",
                rejection.status().as_u16(),
                rejection.body_text(),
            )),
        }
    }
}

impl<T, S> FromRequestParts<S> for Path<T>
where
    axum::extract::Path<T>:
        FromRequestParts<S, Rejection = axum::extract::rejection::PathRejection>,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejected(
                "path",
                rejection.status().as_u16(),
                rejection.body_text(),
            )),
        }
    }
}
