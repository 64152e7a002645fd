//! End-to-end resolution of one incident description
//!
//! `Idle -> Validating -> Retrieving -> Generating -> Done`, with `Failed`
//! reachable from either remote stage. A session is opened only after the
//! input validates and is closed exactly once on every path after that.

use serde::Serialize;
use std::sync::Arc;

use crate::collector;
use crate::config::CortexConfig;
use crate::error::{ResolveError, Stage};
use crate::generator;
use crate::incident::{IncidentQuery, MatchRecord, Recommendation};
use crate::retriever;
use crate::warehouse::{Session, Warehouse};

/// Shown instead of the match table when nothing cleared the threshold.
pub const NO_MATCHES_NOTICE: &str = "No relevant historical incidents found (similarity ≤ 0.60).";

/// Output of a successful request.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
  pub matches: Vec<MatchRecord>,
  pub recommendation: Recommendation,
}

impl Resolution {
  /// Informational message for an empty match list.
  pub fn notice(&self) -> Option<&'static str> {
    self.matches.is_empty().then_some(NO_MATCHES_NOTICE)
  }
}

/// Runs the collector, retriever and generator against a warehouse.
#[derive(Clone)]
pub struct Resolver {
  warehouse: Arc<dyn Warehouse>,
  cortex: CortexConfig,
}

impl Resolver {
  pub fn new(warehouse: Arc<dyn Warehouse>, cortex: CortexConfig) -> Self {
    Self { warehouse, cortex }
  }

  pub fn cortex(&self) -> &CortexConfig {
    &self.cortex
  }

  pub async fn resolve(&self, raw: &str) -> Result<Resolution, ResolveError> {
    transition(Stage::Idle, Stage::Validating);
    let query = match collector::collect(raw) {
      Ok(query) => query,
      Err(warning) => {
        tracing::warn!("Rejected blank incident description");
        return Err(warning.into());
      }
    };

    let session = self.warehouse.connect().await.map_err(|e| {
      tracing::error!("Could not open Snowflake session: {e}");
      ResolveError::Connection(e)
    })?;

    let outcome = self.run(session.as_ref(), &query).await;
    release(session).await;

    match &outcome {
      Ok(_) => transition(Stage::Generating, Stage::Done),
      Err(e) => tracing::error!("{e}"),
    }
    outcome
  }

  async fn run(&self, session: &dyn Session, query: &IncidentQuery) -> Result<Resolution, ResolveError> {
    transition(Stage::Validating, Stage::Retrieving);
    let matches = retriever::retrieve(session, query, &self.cortex)
      .await
      .map_err(|source| fail(Stage::Retrieving, source))?;

    transition(Stage::Retrieving, Stage::Generating);
    let recommendation = generator::generate(session, query, &matches, &self.cortex)
      .await
      .map_err(|source| fail(Stage::Generating, source))?;

    Ok(Resolution { matches, recommendation })
  }
}

fn transition(from: Stage, to: Stage) {
  tracing::debug!("{from} -> {to}");
}

fn fail(stage: Stage, source: crate::warehouse::WarehouseError) -> ResolveError {
  transition(stage, Stage::Failed);
  ResolveError::RemoteCall { stage, source }
}

/// Close the session, logging instead of propagating a failure so the
/// request's own outcome is what the caller sees.
async fn release(session: Box<dyn Session>) {
  if let Err(e) = session.close().await {
    tracing::warn!("Failed to close Snowflake session: {e}");
  }
}
