//! Session storage implementations.
//!
//! Only the in-memory store ships; other backends plug in through
//! `graphdesk_core::auth::SessionRepository`.

mod inmemory;

pub use inmemory::SessionStore;
