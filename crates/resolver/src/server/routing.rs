//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::pipeline::Resolver;
use crate::server::handlers::{form, resolve, status};
use crate::server::middleware::request_context_middleware;

/// Shared handler state. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
  pub resolver: Resolver,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Form
    .route("/", get(form::index))
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/api", get(status::api_info))
    // Resolution
    .route("/api/resolve", post(resolve::resolve_incident))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
