//! Wire types for the Snowflake connector REST protocol

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{Statement, WarehouseError};
use crate::config::SnowflakeConfig;

/// Response codes meaning "query accepted, result not ready yet".
const QUERY_IN_PROGRESS: &str = "333333";
const QUERY_IN_PROGRESS_ASYNC: &str = "333334";

pub const CLIENT_APP_ID: &str = "resolver";

#[derive(Debug, Serialize)]
pub struct LoginRequest {
  pub data: LoginRequestData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LoginRequestData {
  pub client_app_id: String,
  pub client_app_version: String,
  pub account_name: String,
  pub login_name: String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponseData {
  pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
  pub sql_text: String,
  pub async_exec: bool,
  pub sequence_id: u64,
  pub query_submission_time: i64,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub bindings: BTreeMap<String, Binding>,
}

#[derive(Debug, Serialize)]
pub struct Binding {
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponseData {
  #[serde(default)]
  pub rowset: Vec<Vec<Value>>,
  pub get_result_url: Option<String>,
  pub query_id: Option<String>,
}

/// Common envelope wrapping every connector response.
#[derive(Debug, Deserialize)]
pub struct Envelope {
  #[serde(default)]
  pub data: Option<Value>,
  pub code: Option<String>,
  pub message: Option<String>,
  #[serde(default)]
  pub success: bool,
}

impl Envelope {
  pub fn in_progress(&self) -> bool {
    matches!(self.code.as_deref(), Some(QUERY_IN_PROGRESS) | Some(QUERY_IN_PROGRESS_ASYNC))
  }

  /// Turn a refused request into an error, otherwise decode its payload.
  pub fn into_data<T: DeserializeOwned>(self) -> Result<T, WarehouseError> {
    if !self.success {
      return Err(WarehouseError::Rejected {
        code: self.code.unwrap_or_else(|| "unknown".to_string()),
        message: self.message.unwrap_or_else(|| "request failed without a message".to_string()),
      });
    }

    let data = self.data.ok_or_else(|| WarehouseError::Protocol("missing data".to_string()))?;
    serde_json::from_value(data).map_err(|e| WarehouseError::Protocol(e.to_string()))
  }
}

pub fn login_request(config: &SnowflakeConfig) -> LoginRequest {
  LoginRequest {
    data: LoginRequestData {
      client_app_id: CLIENT_APP_ID.to_string(),
      client_app_version: env!("CARGO_PKG_VERSION").to_string(),
      account_name: config.account_name().to_string(),
      login_name: config.user.clone(),
      password: config.password.clone(),
    },
  }
}

/// Build the query body. Bindings are numbered from 1 to match `?` order.
pub fn query_request(statement: &Statement, sequence_id: u64) -> QueryRequest {
  let bindings = statement
    .binds
    .iter()
    .enumerate()
    .map(|(i, value)| ((i + 1).to_string(), Binding { kind: "TEXT", value: value.clone() }))
    .collect();

  QueryRequest {
    sql_text: statement.sql.clone(),
    async_exec: false,
    sequence_id,
    query_submission_time: chrono::Utc::now().timestamp_millis(),
    bindings,
  }
}

/// Header value carrying the session token.
pub fn authorization(token: &str) -> String {
  format!("Snowflake Token=\"{token}\"")
}

/// First column of the first row. Snowflake ships JSON rowsets as strings.
pub fn first_scalar(data: QueryResponseData) -> Option<String> {
  let value = data.rowset.into_iter().next()?.into_iter().next()?;
  match value {
    Value::Null => None,
    Value::String(s) => Some(s),
    other => Some(other.to_string()),
  }
}
