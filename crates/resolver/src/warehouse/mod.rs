//! Warehouse session abstraction
//!
//! The pipeline only needs two capabilities from the data platform: open a
//! session, run a statement that yields a single scalar, and close the session
//! again. Keeping those behind traits lets tests substitute the remote side.

mod protocol;
mod snowflake;

use async_trait::async_trait;
use thiserror::Error;

pub use snowflake::{SnowflakeSession, SnowflakeWarehouse};

/// SQL text plus positional bindings, all bound as `TEXT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
  pub sql: String,
  pub binds: Vec<String>,
}

impl Statement {
  pub fn new(sql: impl Into<String>) -> Self {
    Self { sql: sql.into(), binds: Vec::new() }
  }

  /// Append the value for the next `?` placeholder.
  pub fn bind(mut self, value: impl Into<String>) -> Self {
    self.binds.push(value.into());
    self
  }
}

#[derive(Debug, Error)]
pub enum WarehouseError {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  /// Snowflake answered but refused the request.
  #[error("{message} (code {code})")]
  Rejected { code: String, message: String },

  /// The response did not have the expected shape.
  #[error("Unexpected response: {0}")]
  Protocol(String),

  #[error("Session is already closed")]
  Closed,
}

/// An open session. Exclusively owned by one request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
  /// Execute a statement and return the first column of the first row, or
  /// `None` when the statement produced no rows or a `NULL`.
  async fn query_scalar(&self, statement: &Statement) -> Result<Option<String>, WarehouseError>;

  /// Release the session. Safe to call after a failed statement.
  async fn close(&self) -> Result<(), WarehouseError>;
}

/// Something that can open sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Warehouse: Send + Sync {
  async fn connect(&self) -> Result<Box<dyn Session>, WarehouseError>;
}
