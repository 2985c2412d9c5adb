//! HTTP API for the study app.
//!
//! Exposes profile lookup, study sets, round completion and star toggles as
//! JSON, plus a Prometheus scrape endpoint. Authentication happens upstream:
//! the resolved user id arrives in the `x-user-id` header.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
