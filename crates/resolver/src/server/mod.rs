//! REST API module for the resolver service
//!
//! Serves the incident form and the JSON endpoint behind it. Uses axum for
//! routing and schemars for the published request/response schemas.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod types;

pub use routing::{create_router, AppState};
pub use startup::start_server;
