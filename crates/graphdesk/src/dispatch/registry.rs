use std::{collections::BTreeMap, fmt, sync::Arc};

use axum::{
    handler::Handler,
    middleware,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use super::{
    boundary::{failure_boundary, not_found},
    guard::{enforce_guards, GuardState},
};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    fn method_filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A precondition evaluated before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The caller's session must resolve to a principal.
    Authenticated,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("route {verb} {path} is already registered")]
    DuplicateRoute { verb: Verb, path: String },
}

/// One registered binding of verb and path to a guarded handler.
pub struct RouteDescriptor {
    pub verb: Verb,
    pub path: String,
    pub guards: Vec<Guard>,
    handler: MethodRouter<AppState>,
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

/// Table of every route the server answers.
///
/// Each (verb, path) pair is bound at most once.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: BTreeMap<(String, Verb), RouteDescriptor>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `verb` and `path`, behind `guards` in the given order.
    pub fn register<H, T>(
        &mut self,
        verb: Verb,
        path: &str,
        handler: H,
        guards: &[Guard],
    ) -> Result<&mut Self, RegistryError>
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let key = (path.to_string(), verb);
        if self.routes.contains_key(&key) {
            return Err(RegistryError::DuplicateRoute {
                verb,
                path: path.to_string(),
            });
        }

        tracing::debug!(%verb, path, ?guards, "Registering route");
        self.routes.insert(
            key,
            RouteDescriptor {
                verb,
                path: path.to_string(),
                guards: guards.to_vec(),
                handler: on(verb.method_filter(), handler),
            },
        );
        Ok(self)
    }

    pub fn get<H, T>(
        &mut self,
        path: &str,
        handler: H,
        guards: &[Guard],
    ) -> Result<&mut Self, RegistryError>
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.register(Verb::Get, path, handler, guards)
    }

    pub fn post<H, T>(
        &mut self,
        path: &str,
        handler: H,
        guards: &[Guard],
    ) -> Result<&mut Self, RegistryError>
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.register(Verb::Post, path, handler, guards)
    }

    /// Registered routes, ordered by path then verb.
    pub fn descriptors(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.values()
    }

    /// Build the router that dispatches every registered route.
    pub fn into_router(self, state: AppState) -> Router {
        let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();

        for (_, descriptor) in self.routes {
            let guard_state = GuardState {
                app: state.clone(),
                guards: Arc::from(descriptor.guards),
            };

            // Layers run outside in: the guard wraps the boundary, which wraps the handler.
            let endpoint = descriptor
                .handler
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    failure_boundary,
                ))
                .route_layer(middleware::from_fn_with_state(guard_state, enforce_guards));

            let merged = match by_path.remove(&descriptor.path) {
                Some(existing) => existing.merge(endpoint),
                None => endpoint,
            };
            by_path.insert(descriptor.path, merged);
        }

        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router.fallback(not_found))
            })
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
