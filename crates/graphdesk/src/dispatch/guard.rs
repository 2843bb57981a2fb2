use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use graphdesk_auth::{resolve_session, ResolvedSession};

use super::{boundary::render_failure, Guard};
use crate::{render::RenderedError, state::AppState};

impl Guard {
    /// Whether the guard lets a caller with this session through.
    pub fn allows(&self, session: Option<&ResolvedSession>) -> bool {
        match self {
            Self::Authenticated => session.is_some(),
        }
    }
}

/// State for one route's guard middleware.
#[derive(Clone)]
pub struct GuardState {
    pub app: AppState,
    pub guards: Arc<[Guard]>,
}

/// Resolve the caller's session and evaluate the route's guards in order.
///
/// A declined request is answered with the Guard Declined page and never
/// reaches the handler. Otherwise the resolved session is stored in the
/// request extensions for the handler's extractors.
pub async fn enforce_guards(
    State(state): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Response {
    let resolved = match resolve_session(req.headers(), &state.app.auth).await {
        Ok(resolved) => resolved,
        Err(e) => return render_failure(&state.app, e.into(), req.method(), req.uri().path()),
    };

    if let Some(guard) = state.guards.iter().find(|g| !g.allows(resolved.as_ref())) {
        let path = req.uri().path().to_string();
        tracing::warn!(?guard, method = %req.method(), %path, "Guard declined request");
        return state
            .app
            .renderer
            .render(RenderedError::GuardDeclined { path });
    }

    if let Some(resolved) = resolved {
        req.extensions_mut().insert(resolved);
    }

    next.run(req).await
}
