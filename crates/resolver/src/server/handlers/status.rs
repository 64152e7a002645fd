//! Status and version endpoint handlers

use axum::{
  extract::{Extension, State},
  response::Json,
};

use crate::server::middleware::RequestContext;
use crate::server::routing::AppState;
use crate::server::types::{
  ApiInfoResponse, ApiSchemas, BaseResponse, ResolveRequest, ResolveResponse, StatusResponse,
  VersionResponse,
};

/// GET /status - Health check endpoint
pub async fn status(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> Json<BaseResponse<StatusResponse>> {
  let cortex = state.resolver.cortex();
  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    embed_model: cortex.embed_model.clone(),
    completion_model: cortex.completion_model.clone(),
    incident_table: cortex.incident_table.clone(),
  };

  Json(BaseResponse::success(response, context.request_id))
}

/// GET /version - Returns current API version
pub async fn version(Extension(context): Extension<RequestContext>) -> Json<BaseResponse<VersionResponse>> {
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };
  Json(BaseResponse::success(response, context.request_id))
}

/// GET /api - Returns API information and body schemas
pub async fn api_info(Extension(context): Extension<RequestContext>) -> Json<BaseResponse<ApiInfoResponse>> {
  let response = ApiInfoResponse {
    latest: env!("CARGO_PKG_VERSION").to_string(),
    schemas: ApiSchemas {
      resolve_request: schemars::schema_for!(ResolveRequest),
      resolve_response: schemars::schema_for!(ResolveResponse),
    },
  };

  Json(BaseResponse::success(response, context.request_id))
}
