//! Request-scoped data: the submitted description, the historical matches
//! retrieved for it and the generated recommendation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-blank incident description, kept exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentQuery {
  description: String,
}

impl IncidentQuery {
  /// Wrap a description without checking it. Use [`crate::collector::collect`]
  /// for user input.
  pub(crate) fn new_unchecked(description: String) -> Self {
    Self { description }
  }

  pub fn description(&self) -> &str {
    &self.description
  }
}

/// Identifier of a historical incident. Stored as a number or a string
/// depending on how the incident table was loaded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IncidentId {
  Number(i64),
  Text(String),
}

impl fmt::Display for IncidentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IncidentId::Number(n) => write!(f, "{n}"),
      IncidentId::Text(s) => f.write_str(s),
    }
  }
}

/// One historical incident returned by the similarity search.
///
/// Field order is significant: it is the order used when the list is
/// serialized into the generation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchRecord {
  /// Identifier of the historical incident
  pub incident_id: IncidentId,

  /// Short description recorded for the incident
  #[serde(default)]
  pub short_desc: String,

  /// How the incident was resolved
  #[serde(default)]
  pub resolution: String,

  /// Cosine similarity to the submitted description
  pub similarity: f64,
}

/// Recommendation text as returned by the completion model, with line breaks
/// converted to markdown hard breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Recommendation(String);

impl Recommendation {
  pub(crate) fn new(text: String) -> Self {
    Self(text)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl fmt::Display for Recommendation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
