//! graphdesk_client - Microsoft Graph client for graphdesk.

pub mod api;
pub mod client;
pub mod error;

pub use api::GraphApi;
pub use client::GraphClient;
pub use error::{ClientError, Result};
