//! Request context and middleware for the resolver REST API
//!
//! Every request gets an id that handlers reuse as the response transaction
//! id, so a log line and the JSON a user reports can be matched up.

use axum::{
  extract::Request,
  http::{HeaderMap, HeaderName, HeaderValue, Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Response header echoing the request id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request context containing request metadata
#[derive(Debug, Clone)]
pub struct RequestContext {
  /// Unique ID for this request
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  pub headers: HeaderMap,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, headers }
  }

  fn user_agent(&self) -> &str {
    self
      .headers
      .get("user-agent")
      .map(|v| v.to_str().unwrap_or("unknown"))
      .unwrap_or("none")
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context =
    RequestContext::new(request.method().clone(), request.uri().clone(), request.headers().clone());

  let span = tracing::info_span!(
    "request",
    id = %context.request_id,
    method = %context.method,
    path = context.uri.path()
  );

  async move {
    let start_time = Instant::now();
    tracing::debug!("Request started (User-Agent: {})", context.user_agent());

    let request_id = context.request_id;
    request.extensions_mut().insert(context);
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
      response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    tracing::info!("Request completed (Status: {}, Duration: {:.2}ms)", response.status().as_u16(), duration_ms);
    response
  }
  .instrument(span)
  .await
}
