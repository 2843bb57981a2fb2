//! Functional core for graphdesk.
//!
//! - [`auth`]: principals, session storage and identity provider abstractions
//! - [`failure`]: request failures and expired-token classification
//! - [`pagination`]: continuation-link walker
//! - [`drive`], [`mail`]: Graph resource models and payloads

pub mod auth;
pub mod drive;
pub mod failure;
pub mod mail;
pub mod pagination;
pub mod serde;
