//! Request dispatch.
//!
//! Routes are registered in a [`RouteRegistry`] and turned into an axum
//! [`Router`](axum::Router) with [`RouteRegistry::into_router`]. Every request
//! then goes through the same chain:
//!
//! 1. no matching verb and path: the Not Found page;
//! 2. [`guard::enforce_guards`] resolves the session and evaluates the route's
//!    guards in order, the first decline ends the request;
//! 3. [`boundary::failure_boundary`] runs the handler, and a returned failure
//!    or a panic is classified and rendered exactly once.

pub mod boundary;
pub mod guard;
pub mod registry;

pub use registry::{Guard, RegistryError, RouteRegistry};
