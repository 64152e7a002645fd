//! Similarity retrieval of historical incidents
//!
//! Embedding, cosine comparison, thresholding, de-duplication and the top-N
//! cut all happen inside one Snowflake statement. This module builds that
//! statement and turns its JSON aggregate back into [`MatchRecord`]s.

use std::cmp::Ordering;
use thiserror::Error;

use crate::config::CortexConfig;
use crate::incident::{IncidentQuery, MatchRecord};
use crate::warehouse::{Session, Statement, WarehouseError};

/// Records must score strictly above this to be returned.
pub const SIMILARITY_THRESHOLD: f64 = 0.60;

/// Maximum number of records returned.
pub const MATCH_LIMIT: usize = 5;

/// Serialized form of an empty match list.
pub const EMPTY_MATCHES: &str = "[]";

#[derive(Debug, Error)]
#[error("Malformed similarity payload: {0}")]
pub struct MatchParseError(#[from] serde_json::Error);

/// Build the single statement that embeds the description and ranks stored
/// incidents against it. The description is bound, never spliced.
pub fn similarity_statement(query: &IncidentQuery, cortex: &CortexConfig) -> Statement {
  let sql = format!(
    r#"
WITH INPUT_EMB AS (
    SELECT SNOWFLAKE.CORTEX.EMBED_TEXT_768('{model}', ?) AS EMB
),
MATCHES AS (
    SELECT DISTINCT
        INCIDENT_ID,
        SHORT_DESC,
        RESOLUTION,
        VECTOR_COSINE_SIMILARITY(FULL_TEXT_EMBED, (SELECT EMB FROM INPUT_EMB)) AS SIM
    FROM {table}
    WHERE VECTOR_COSINE_SIMILARITY(FULL_TEXT_EMBED, (SELECT EMB FROM INPUT_EMB)) > {threshold:.2}
    ORDER BY SIM DESC, INCIDENT_ID
    LIMIT {limit}
)
SELECT ARRAY_AGG(
    OBJECT_CONSTRUCT(
        'incident_id', INCIDENT_ID,
        'short_desc', SHORT_DESC,
        'resolution', RESOLUTION,
        'similarity', SIM
    )
) WITHIN GROUP (ORDER BY SIM DESC, INCIDENT_ID)::STRING AS MATCH_ARRAY
FROM MATCHES;
"#,
    model = cortex.embed_model,
    table = cortex.incident_table,
    threshold = SIMILARITY_THRESHOLD,
    limit = MATCH_LIMIT,
  );

  Statement::new(sql).bind(query.description())
}

/// Parse the aggregated match array.
pub fn parse_matches(payload: &str) -> Result<Vec<MatchRecord>, MatchParseError> {
  Ok(serde_json::from_str(payload)?)
}

/// Sort by similarity descending, then incident id ascending. Stable and
/// never drops records.
pub fn order_matches(matches: &mut [MatchRecord]) {
  matches.sort_by(|a, b| match b.similarity.total_cmp(&a.similarity) {
    Ordering::Equal => a.incident_id.cmp(&b.incident_id),
    other => other,
  });
}

/// Run the similarity statement on an open session.
///
/// A `NULL` aggregate means no rows qualified. A payload that does not parse
/// is replaced by an empty list; only the remote call itself can fail.
pub async fn retrieve(
  session: &dyn Session,
  query: &IncidentQuery,
  cortex: &CortexConfig,
) -> Result<Vec<MatchRecord>, WarehouseError> {
  let payload = session
    .query_scalar(&similarity_statement(query, cortex))
    .await?
    .unwrap_or_else(|| EMPTY_MATCHES.to_string());

  let mut matches = match parse_matches(&payload) {
    Ok(matches) => matches,
    Err(e) => {
      tracing::warn!("{e}; continuing without historical matches");
      Vec::new()
    }
  };

  order_matches(&mut matches);
  tracing::info!("Retrieved {} similar incident(s)", matches.len());
  Ok(matches)
}
