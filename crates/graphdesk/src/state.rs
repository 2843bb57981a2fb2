//! Shared application state.

use std::sync::Arc;

use graphdesk_auth::AuthState;
use graphdesk_client::GraphApi;

use crate::render::ErrorRenderer;

/// Shared application state.
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub graph: Arc<dyn GraphApi>,
    pub renderer: Arc<dyn ErrorRenderer>,
}

impl AppState {
    pub fn new(
        auth: AuthState,
        graph: Arc<dyn GraphApi>,
        renderer: Arc<dyn ErrorRenderer>,
    ) -> Self {
        Self {
            auth,
            graph,
            renderer,
        }
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}
