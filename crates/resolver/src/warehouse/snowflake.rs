//! Snowflake connector client
//!
//! Speaks the same REST protocol the official drivers use: a user/password
//! login that yields a session token, synchronous query requests with
//! positional bindings, result polling for long-running statements, and an
//! explicit session delete on close.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;
use uuid::Uuid;

use super::protocol::{self, Envelope, LoginResponseData, QueryResponseData};
use super::{Session, Statement, Warehouse, WarehouseError};
use crate::config::SnowflakeConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Opens authenticated sessions against one Snowflake account.
pub struct SnowflakeWarehouse {
  client: Client,
  config: SnowflakeConfig,
  base_url: Url,
}

impl SnowflakeWarehouse {
  pub fn new(config: SnowflakeConfig) -> Result<Self, WarehouseError> {
    let base_url = config.base_url().map_err(|e| WarehouseError::Protocol(e.to_string()))?;
    let client = Client::builder()
      .user_agent(concat!("resolver/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self { client, config, base_url })
  }

  pub fn config(&self) -> &SnowflakeConfig {
    &self.config
  }

  fn login_params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![
      ("request_id", Uuid::new_v4().to_string()),
      ("warehouse", self.config.warehouse.clone()),
      ("databaseName", self.config.database.clone()),
      ("schemaName", self.config.schema.clone()),
    ];
    if let Some(role) = &self.config.role {
      params.push(("roleName", role.clone()));
    }
    params
  }
}

#[async_trait]
impl Warehouse for SnowflakeWarehouse {
  async fn connect(&self) -> Result<Box<dyn Session>, WarehouseError> {
    let url = endpoint(&self.base_url, "session/v1/login-request")?;
    tracing::debug!("Logging in to {} as {}", self.base_url, self.config.user);

    let response = self
      .client
      .post(url)
      .query(&self.login_params())
      .header(header::ACCEPT, "application/json")
      .json(&protocol::login_request(&self.config))
      .send()
      .await?;

    let login: LoginResponseData = read_envelope(response).await?.into_data()?;
    tracing::debug!("Snowflake session established");

    Ok(Box::new(SnowflakeSession {
      client: self.client.clone(),
      base_url: self.base_url.clone(),
      token: login.token,
      sequence: AtomicU64::new(0),
      closed: AtomicBool::new(false),
    }))
  }
}

/// An authenticated connector session.
pub struct SnowflakeSession {
  client: Client,
  base_url: Url,
  token: String,
  sequence: AtomicU64,
  closed: AtomicBool,
}

impl SnowflakeSession {
  async fn poll(&self, result_path: &str) -> Result<Envelope, WarehouseError> {
    let url = endpoint(&self.base_url, result_path)?;
    let response = self
      .client
      .get(url)
      .header(header::AUTHORIZATION, protocol::authorization(&self.token))
      .header(header::ACCEPT, "application/json")
      .send()
      .await?;
    read_envelope(response).await
  }
}

#[async_trait]
impl Session for SnowflakeSession {
  async fn query_scalar(&self, statement: &Statement) -> Result<Option<String>, WarehouseError> {
    if self.closed.load(Ordering::SeqCst) {
      return Err(WarehouseError::Closed);
    }

    let sequence_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
    let url = endpoint(&self.base_url, "queries/v1/query-request")?;
    let response = self
      .client
      .post(url)
      .query(&[("requestId", Uuid::new_v4().to_string())])
      .header(header::AUTHORIZATION, protocol::authorization(&self.token))
      .header(header::ACCEPT, "application/json")
      .json(&protocol::query_request(statement, sequence_id))
      .send()
      .await?;

    let mut envelope = read_envelope(response).await?;
    while envelope.in_progress() {
      let pending: QueryResponseData = envelope.into_data()?;
      let result_path = pending.get_result_url.ok_or_else(|| {
        WarehouseError::Protocol("query still running but no result URL was given".to_string())
      })?;
      tracing::debug!("Query {} still running, polling", pending.query_id.as_deref().unwrap_or("?"));
      sleep(POLL_INTERVAL).await;
      envelope = self.poll(&result_path).await?;
    }

    let data: QueryResponseData = envelope.into_data()?;
    if let Some(query_id) = &data.query_id {
      tracing::debug!("Query {query_id} finished");
    }
    Ok(protocol::first_scalar(data))
  }

  async fn close(&self) -> Result<(), WarehouseError> {
    if self.closed.swap(true, Ordering::SeqCst) {
      return Ok(());
    }

    let url = endpoint(&self.base_url, "session")?;
    let response = self
      .client
      .post(url)
      .query(&[("delete", "true")])
      .header(header::AUTHORIZATION, protocol::authorization(&self.token))
      .header(header::ACCEPT, "application/json")
      .send()
      .await?;

    let envelope = read_envelope(response).await?;
    if !envelope.success {
      return Err(WarehouseError::Rejected {
        code: envelope.code.unwrap_or_else(|| "unknown".to_string()),
        message: envelope.message.unwrap_or_else(|| "session delete failed".to_string()),
      });
    }
    Ok(())
  }
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, WarehouseError> {
  base_url.join(path).map_err(|e| WarehouseError::Protocol(format!("invalid endpoint '{path}': {e}")))
}

async fn read_envelope(response: Response) -> Result<Envelope, WarehouseError> {
  let status = response.status();
  let body = response.text().await?;

  if !status.is_success() {
    return Err(WarehouseError::Rejected {
      code: status.as_u16().to_string(),
      message: if body.is_empty() { status.to_string() } else { body },
    });
  }

  serde_json::from_str(&body).map_err(|e| WarehouseError::Protocol(format!("invalid JSON: {e}")))
}
