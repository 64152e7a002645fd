//! Error types surfaced by a resolution request

use std::fmt;
use thiserror::Error;

use crate::warehouse::WarehouseError;

/// Where a request currently is. `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Idle,
  Validating,
  Retrieving,
  Generating,
  Done,
  Failed,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Idle => "idle",
      Stage::Validating => "validating",
      Stage::Retrieving => "similarity search",
      Stage::Generating => "recommendation generation",
      Stage::Done => "done",
      Stage::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Blank incident description. A warning, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please enter an incident description.")]
pub struct ValidationError;

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The session could not be opened.
  #[error("Error while connecting to Snowflake: {0}")]
  Connection(#[source] WarehouseError),

  /// One of the two remote statements failed.
  #[error("Error while querying Snowflake during {stage}: {source}")]
  RemoteCall {
    stage: Stage,
    #[source]
    source: WarehouseError,
  },
}

impl ResolveError {
  /// True for input problems that should be shown as a warning.
  pub fn is_warning(&self) -> bool {
    matches!(self, ResolveError::Validation(_))
  }

  /// Stable key for API consumers.
  pub fn key(&self) -> &'static str {
    match self {
      ResolveError::Validation(_) => "validation_failed",
      ResolveError::Connection(_) => "connection_failed",
      ResolveError::RemoteCall { .. } => "remote_call_failed",
    }
  }
}
