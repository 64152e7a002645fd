//! Incident resolution endpoint handler

use axum::{
  extract::{rejection::JsonRejection, Extension, Json, State},
  http::StatusCode,
  response::Json as ResponseJson,
};

use crate::error::ResolveError;
use crate::server::middleware::RequestContext;
use crate::server::routing::AppState;
use crate::server::types::{ApiError, BaseResponse, ResolveRequest, ResolveResponse};

type ErrorReply = (StatusCode, ResponseJson<BaseResponse<()>>);

/// POST /api/resolve - Retrieve similar incidents and generate a recommendation
pub async fn resolve_incident(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<ResponseJson<BaseResponse<ResolveResponse>>, ErrorReply> {
  let transaction_id = context.request_id;

  let Json(request) = payload.map_err(|rejection| {
    tracing::warn!("Rejected resolve request body: {}", rejection.body_text());
    let error = ApiError::new("invalid_request", &rejection.body_text());
    (StatusCode::BAD_REQUEST, ResponseJson(BaseResponse::<()>::error(vec![error], transaction_id)))
  })?;

  match state.resolver.resolve(&request.incident_text).await {
    Ok(resolution) => {
      tracing::info!("Resolved incident with {} similar match(es)", resolution.matches.len());
      Ok(ResponseJson(BaseResponse::success(resolution.into(), transaction_id)))
    }
    Err(e) => {
      let (status, error) = match &e {
        ResolveError::Validation(_) => {
          (StatusCode::BAD_REQUEST, ApiError::warning(e.key(), &e.to_string()))
        }
        ResolveError::Connection(_) | ResolveError::RemoteCall { .. } => {
          (StatusCode::BAD_GATEWAY, ApiError::new(e.key(), &e.to_string()))
        }
      };
      Err((status, ResponseJson(BaseResponse::<()>::error(vec![error], transaction_id))))
    }
  }
}
