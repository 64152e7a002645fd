//! Recommendation generation through Cortex `COMPLETE`

use crate::config::CortexConfig;
use crate::incident::{IncidentQuery, MatchRecord, Recommendation};
use crate::retriever::EMPTY_MATCHES;
use crate::warehouse::{Session, Statement, WarehouseError};

/// Build the analyst prompt for one incident and its historical matches.
///
/// The description and the serialized matches each appear exactly once.
pub fn build_prompt(query: &IncidentQuery, matches: &[MatchRecord]) -> String {
  let matches_json = if matches.is_empty() {
    EMPTY_MATCHES.to_string()
  } else {
    serde_json::to_string(matches).unwrap_or_else(|_| EMPTY_MATCHES.to_string())
  };

  format!(
    r#"
You are an expert incident analyst.

A new incident occurred:
{description}

Here are the similar historical incidents in JSON:
{matches_json}

Using ONLY this information, return the output in this exact structure:

1. Similar Incident IDs:
   - Comma-separated list of incident_ids, or "None".

2. Unified Root Cause:
   - One concise root cause summarizing patterns found.

3. Recommended Resolution (4–7 Steps):
   - Numbered steps.
   - Combine only relevant actions from past incidents.
   - Avoid repetition.

4. Validation Steps (3–5 Steps):
   - Numbered steps.
   - Confirm the fix.

5. Action Summary:
   - 1–2 crisp sentences describing the final fix and prevention.

Do NOT repeat the incident description.
Do NOT repeat the JSON input.
Only output the structured answer.
"#,
    description = query.description(),
  )
}

/// Statement sending a prompt to the completion model. The prompt is bound.
pub fn completion_statement(prompt: &str, cortex: &CortexConfig) -> Statement {
  let sql = format!(
    "SELECT SNOWFLAKE.CORTEX.COMPLETE('{model}', ?) AS AI_SOLUTION;",
    model = cortex.completion_model
  );
  Statement::new(sql).bind(prompt)
}

/// Turn every newline into a markdown hard break so numbered lists keep
/// their line structure when rendered.
pub fn hard_line_breaks(text: &str) -> String {
  text.replace('\n', "  \n")
}

/// Ask the completion model for a recommendation.
pub async fn generate(
  session: &dyn Session,
  query: &IncidentQuery,
  matches: &[MatchRecord],
  cortex: &CortexConfig,
) -> Result<Recommendation, WarehouseError> {
  let prompt = build_prompt(query, matches);
  tracing::debug!("Sending {} character prompt to {}", prompt.len(), cortex.completion_model);

  let text = session
    .query_scalar(&completion_statement(&prompt, cortex))
    .await?
    .ok_or_else(|| WarehouseError::Protocol("completion returned no text".to_string()))?;

  Ok(Recommendation::new(hard_line_breaks(&text)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::collector::collect;
  use crate::incident::IncidentId;
  use crate::warehouse::{MockSession, Statement};

  const DESCRIPTION: &str = "API gateway timeout when payload delivery happened";

  fn gateway_match() -> MatchRecord {
    MatchRecord {
      incident_id: IncidentId::Number(101),
      short_desc: "gateway timeout".into(),
      resolution: "restarted gateway".into(),
      similarity: 0.82,
    }
  }

  #[test]
  fn prompt_embeds_description_and_matches_once() {
    let query = collect(DESCRIPTION).unwrap();
    let prompt = build_prompt(&query, &[gateway_match()]);

    assert_eq!(prompt.matches(DESCRIPTION).count(), 1);
    assert_eq!(
      prompt
        .matches(r#"[{"incident_id":101,"short_desc":"gateway timeout","resolution":"restarted gateway","similarity":0.82}]"#)
        .count(),
      1
    );
    assert!(prompt.contains("101"));
    assert!(prompt.contains("0.82"));
  }

  #[test]
  fn empty_matches_render_as_empty_array() {
    let query = collect(DESCRIPTION).unwrap();
    let prompt = build_prompt(&query, &[]);

    assert!(prompt.contains("in JSON:\n[]\n"));
    assert!(prompt.contains(r#"or "None"."#));
  }

  #[test]
  fn prompt_states_role_structure_and_restrictions() {
    let query = collect(DESCRIPTION).unwrap();
    let prompt = build_prompt(&query, &[]);

    assert!(prompt.contains("expert incident analyst"));
    for section in [
      "1. Similar Incident IDs:",
      "2. Unified Root Cause:",
      "3. Recommended Resolution (4–7 Steps):",
      "4. Validation Steps (3–5 Steps):",
      "5. Action Summary:",
    ] {
      assert!(prompt.contains(section), "missing section {section}");
    }
    assert!(prompt.contains("Do NOT repeat the incident description."));
    assert!(prompt.contains("Do NOT repeat the JSON input."));
  }

  #[test]
  fn completion_statement_binds_prompt() {
    let statement = completion_statement("hello 'world'", &CortexConfig::default());
    assert_eq!(statement.sql, "SELECT SNOWFLAKE.CORTEX.COMPLETE('snowflake-arctic', ?) AS AI_SOLUTION;");
    assert_eq!(statement.binds, vec!["hello 'world'".to_string()]);
  }

  #[test]
  fn hard_breaks_precede_every_newline() {
    assert_eq!(hard_line_breaks("1. a\n2. b\n\nDone"), "1. a  \n2. b  \n  \nDone");
    assert_eq!(hard_line_breaks("single line"), "single line");
  }

  #[tokio::test]
  async fn generate_normalizes_line_breaks() {
    let mut session = MockSession::new();
    session
      .expect_query_scalar()
      .withf(|statement: &Statement| statement.sql.contains("CORTEX.COMPLETE"))
      .times(1)
      .returning(|_| Ok(Some("1. Similar Incident IDs:\n   - 101".to_string())));

    let query = collect(DESCRIPTION).unwrap();
    let recommendation =
      generate(&session, &query, &[gateway_match()], &CortexConfig::default()).await.unwrap();

    assert_eq!(recommendation.as_str(), "1. Similar Incident IDs:  \n   - 101");
  }

  #[tokio::test]
  async fn null_completion_is_an_error() {
    let mut session = MockSession::new();
    session.expect_query_scalar().times(1).returning(|_| Ok(None));

    let query = collect(DESCRIPTION).unwrap();
    let result = generate(&session, &query, &[], &CortexConfig::default()).await;
    assert!(matches!(result, Err(WarehouseError::Protocol(_))));
  }
}
