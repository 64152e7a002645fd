//! Input collection for the resolution pipeline

use crate::error::ValidationError;
use crate::incident::IncidentQuery;

/// Accept a description if it has any non-whitespace content.
///
/// The original text is forwarded untouched; trimming only decides validity.
pub fn collect(raw: &str) -> Result<IncidentQuery, ValidationError> {
  if raw.trim().is_empty() {
    return Err(ValidationError);
  }

  Ok(IncidentQuery::new_unchecked(raw.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_inputs_are_rejected() {
    for raw in ["", " ", "\n\t  \r\n", "\u{3000}"] {
      assert_eq!(collect(raw), Err(ValidationError), "input {raw:?}");
    }
  }

  #[test]
  fn surrounding_whitespace_is_preserved() {
    let query = collect("  API gateway timeout \n").unwrap();
    assert_eq!(query.description(), "  API gateway timeout \n");
  }
}
