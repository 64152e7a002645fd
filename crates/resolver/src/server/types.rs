//! REST API types with schemars annotations for schema generation

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::incident::MatchRecord;
use crate::pipeline::Resolution;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  pub latest: String,
  pub resolved: String,
}

/// API error information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Whether the client should present this as a warning rather than an error
  #[serde(default)]
  pub warning: bool,
}

// Status/Version Endpoints
// =======================

/// Response for /status endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  /// Embedding model used for similarity search
  pub embed_model: String,
  /// Completion model used for recommendations
  pub completion_model: String,
  /// Table holding historical incident embeddings
  pub incident_table: String,
}

/// Response for /version endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  pub version: String,
}

/// Response for /api endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfoResponse {
  pub latest: String,

  /// JSON schemas of the resolve request and response bodies
  pub schemas: ApiSchemas,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSchemas {
  pub resolve_request: schemars::schema::RootSchema,
  pub resolve_response: schemars::schema::RootSchema,
}

// Resolve Endpoint
// ================

/// Request for /api/resolve endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ResolveRequest {
  /// Free-text description of the new incident. A missing field is treated
  /// as an empty description.
  #[serde(default, alias = "incidentText")]
  pub incident_text: String,
}

/// Response for /api/resolve endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ResolveResponse {
  /// Up to five historical incidents, most similar first
  pub similar_incidents: Vec<MatchRecord>,

  /// Markdown recommendation from the completion model
  pub recommendation: String,

  /// Informational message, set when no historical incident qualified
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub notice: Option<String>,

  /// When the recommendation was produced
  pub generated_at: DateTime<Utc>,
}

impl From<Resolution> for ResolveResponse {
  fn from(resolution: Resolution) -> Self {
    let notice = resolution.notice().map(str::to_string);
    Self {
      similar_incidents: resolution.matches,
      recommendation: resolution.recommendation.into_string(),
      notice,
      generated_at: Utc::now(),
    }
  }
}

// Helper Functions
// ================

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: VersionInfo::current(), transaction_id, errors: Vec::new(), data }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: VersionInfo::current(), transaction_id, errors, data: () }
  }
}

impl VersionInfo {
  fn current() -> Self {
    let version = env!("CARGO_PKG_VERSION");
    Self { latest: version.to_string(), resolved: version.to_string() }
  }
}

impl ApiError {
  /// Create a new API error
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), warning: false }
  }

  /// Create a new API warning
  pub fn warning(key: &str, message: &str) -> Self {
    Self { warning: true, ..Self::new(key, message) }
  }
}
