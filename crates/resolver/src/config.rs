//! Connection and model configuration
//!
//! Everything needed to reach Snowflake is carried in explicit structs that
//! the binaries build from flags or `SNOWFLAKE_*` / `RESOLVER_*` environment
//! variables and then hand to [`crate::warehouse::SnowflakeWarehouse`].

use clap::Args;
use std::fmt;
use thiserror::Error;
use url::Url;

pub const DEFAULT_EMBED_MODEL: &str = "snowflake-arctic-embed-m";
pub const DEFAULT_COMPLETION_MODEL: &str = "snowflake-arctic";
pub const DEFAULT_INCIDENT_TABLE: &str = "INCIDENT_VECTOR_STORE";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  /// A required setting was supplied but left empty.
  #[error("Configuration value '{field}' must not be empty")]
  Missing { field: &'static str },

  /// A setting has a value that cannot be used.
  #[error("Invalid configuration value for '{field}': {reason}")]
  InvalidValue { field: &'static str, reason: String },
}

/// Credentials and session context for the Snowflake account.
#[derive(Clone, Args)]
pub struct SnowflakeConfig {
  /// Account identifier, e.g. `xy12345.us-east-1`
  #[arg(long, env = "SNOWFLAKE_ACCOUNT")]
  pub account: String,

  /// Login name
  #[arg(long, env = "SNOWFLAKE_USER")]
  pub user: String,

  /// Login password
  #[arg(long, env = "SNOWFLAKE_PASSWORD", hide_env_values = true)]
  pub password: String,

  /// Virtual warehouse that runs the Cortex functions
  #[arg(long, env = "SNOWFLAKE_WAREHOUSE")]
  pub warehouse: String,

  /// Database holding the incident vector store
  #[arg(long, env = "SNOWFLAKE_DATABASE")]
  pub database: String,

  /// Schema holding the incident vector store
  #[arg(long, env = "SNOWFLAKE_SCHEMA")]
  pub schema: String,

  /// Optional role to assume for the session
  #[arg(long, env = "SNOWFLAKE_ROLE")]
  pub role: Option<String>,

  /// Override the account URL (private link, proxies, tests)
  #[arg(long = "snowflake-host", env = "SNOWFLAKE_HOST")]
  pub host: Option<String>,
}

impl fmt::Debug for SnowflakeConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SnowflakeConfig")
      .field("account", &self.account)
      .field("user", &self.user)
      .field("password", &"<redacted>")
      .field("warehouse", &self.warehouse)
      .field("database", &self.database)
      .field("schema", &self.schema)
      .field("role", &self.role)
      .field("host", &self.host)
      .finish()
  }
}

impl SnowflakeConfig {
  /// Check that every required field carries a value and the host parses.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let required = [
      ("account", &self.account),
      ("user", &self.user),
      ("password", &self.password),
      ("warehouse", &self.warehouse),
      ("database", &self.database),
      ("schema", &self.schema),
    ];

    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(ConfigError::Missing { field });
      }
    }

    self.base_url().map(|_| ())
  }

  /// Account name as Snowflake expects it at login: the locator without
  /// region or cloud suffixes.
  pub fn account_name(&self) -> &str {
    self.account.split('.').next().unwrap_or(&self.account)
  }

  /// Base URL every connector request is issued against.
  pub fn base_url(&self) -> Result<Url, ConfigError> {
    let raw = match &self.host {
      Some(host) if !host.trim().is_empty() => host.trim().to_string(),
      _ => format!("https://{}.snowflakecomputing.com", self.account.trim()),
    };

    Url::parse(&raw)
      .map_err(|e| ConfigError::InvalidValue { field: "host", reason: e.to_string() })
  }
}

/// Cortex model names and the table holding historical incident embeddings.
///
/// These values end up inside statement text (Cortex expects constant model
/// names), so they are restricted to a conservative character set.
#[derive(Debug, Clone, Args)]
pub struct CortexConfig {
  /// Embedding model passed to `EMBED_TEXT_768`
  #[arg(long, env = "RESOLVER_EMBED_MODEL", default_value = DEFAULT_EMBED_MODEL)]
  pub embed_model: String,

  /// Completion model passed to `COMPLETE`
  #[arg(long, env = "RESOLVER_COMPLETION_MODEL", default_value = DEFAULT_COMPLETION_MODEL)]
  pub completion_model: String,

  /// Table with `INCIDENT_ID`, `SHORT_DESC`, `RESOLUTION`, `FULL_TEXT_EMBED`
  #[arg(long, env = "RESOLVER_INCIDENT_TABLE", default_value = DEFAULT_INCIDENT_TABLE)]
  pub incident_table: String,
}

impl Default for CortexConfig {
  fn default() -> Self {
    Self {
      embed_model: DEFAULT_EMBED_MODEL.to_string(),
      completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
      incident_table: DEFAULT_INCIDENT_TABLE.to_string(),
    }
  }
}

impl CortexConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    check_model_name("embed_model", &self.embed_model)?;
    check_model_name("completion_model", &self.completion_model)?;
    check_table_name(&self.incident_table)
  }
}

fn check_model_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
  if value.is_empty() {
    return Err(ConfigError::Missing { field });
  }

  let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
  if !value.chars().all(allowed) {
    return Err(ConfigError::InvalidValue {
      field,
      reason: format!("'{value}' may only contain letters, digits, '-', '_' and '.'"),
    });
  }

  Ok(())
}

fn check_table_name(value: &str) -> Result<(), ConfigError> {
  let field = "incident_table";
  if value.is_empty() {
    return Err(ConfigError::Missing { field });
  }

  // Optionally qualified: DB.SCHEMA.TABLE
  let valid_part = |part: &str| {
    part.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
      && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
  };

  if !value.split('.').all(valid_part) {
    return Err(ConfigError::InvalidValue {
      field,
      reason: format!("'{value}' is not a plain table identifier"),
    });
  }

  Ok(())
}

/// Load a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
  if let Ok(path) = dotenvy::dotenv() {
    tracing::debug!("Loaded environment from {}", path.display());
  }
}
