//! Terminal front end

pub mod display;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{CortexConfig, SnowflakeConfig};
use crate::pipeline::Resolver;
use crate::warehouse::{SnowflakeWarehouse, Warehouse};

/// Validate configuration and build a resolver backed by Snowflake.
pub fn build_resolver(snowflake: SnowflakeConfig, cortex: CortexConfig) -> Result<Resolver> {
  snowflake.validate().context("Invalid Snowflake configuration")?;
  cortex.validate().context("Invalid Cortex configuration")?;

  let warehouse = SnowflakeWarehouse::new(snowflake)?;
  Ok(Resolver::new(Arc::new(warehouse), cortex))
}

/// Resolve one description and print the outcome.
pub async fn resolve(resolver: &Resolver, description: &str, json: bool) -> Result<()> {
  match resolver.resolve(description).await {
    Ok(resolution) => {
      if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
      } else {
        display::display_resolution(&resolution);
      }
      Ok(())
    }
    Err(e) if e.is_warning() => {
      display::display_warning(&e.to_string());
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}

/// Open and close a session to prove the credentials work.
pub async fn check(snowflake: SnowflakeConfig) -> Result<()> {
  snowflake.validate().context("Invalid Snowflake configuration")?;
  let account = snowflake.account.clone();
  let warehouse = SnowflakeWarehouse::new(snowflake)?;

  let session = warehouse.connect().await.context("Error while connecting to Snowflake")?;
  if let Err(e) = session.close().await {
    tracing::warn!("Failed to close Snowflake session: {e}");
  }

  println!("Connected to Snowflake account {account}");
  Ok(())
}
