//! HTTP API: the chat page and the session endpoints.

pub mod page;
mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
