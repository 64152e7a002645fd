//! Display formatting utilities for CLI output

use colored::*;

use crate::incident::MatchRecord;
use crate::pipeline::Resolution;

const ID_WIDTH: usize = 12;
const SIMILARITY_WIDTH: usize = 10;
const TEXT_WIDTH: usize = 40;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let words: Vec<&str> = paragraph.split_whitespace().collect();
    let mut current_line = String::new();

    for word in words {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

fn pad(text: &str, width: usize) -> String {
  let len = text.chars().count();
  if len >= width {
    text.to_string()
  } else {
    format!("{text}{}", " ".repeat(width - len))
  }
}

/// Render the similar-incident table as plain lines (no colors).
pub fn match_table(matches: &[MatchRecord]) -> Vec<String> {
  let mut lines = vec![format!(
    "{} | {} | {} | {}",
    pad("Incident ID", ID_WIDTH),
    pad("Similarity", SIMILARITY_WIDTH),
    pad("Short Description", TEXT_WIDTH),
    "Resolution"
  )];
  lines.push("-".repeat(ID_WIDTH + SIMILARITY_WIDTH + 2 * TEXT_WIDTH + 9));

  for record in matches {
    let descriptions = wrap_text(&record.short_desc, TEXT_WIDTH);
    let resolutions = wrap_text(&record.resolution, TEXT_WIDTH);
    let height = descriptions.len().max(resolutions.len()).max(1);

    for row in 0..height {
      let (id, similarity) = if row == 0 {
        (record.incident_id.to_string(), format!("{:.4}", record.similarity))
      } else {
        (String::new(), String::new())
      };
      let description = descriptions.get(row).map(String::as_str).unwrap_or("");
      let resolution = resolutions.get(row).map(String::as_str).unwrap_or("");

      lines.push(
        format!(
          "{} | {} | {} | {}",
          pad(&id, ID_WIDTH),
          pad(&similarity, SIMILARITY_WIDTH),
          pad(description, TEXT_WIDTH),
          resolution
        )
        .trim_end()
        .to_string(),
      );
    }
  }

  lines
}

/// Print the full outcome of a resolution request
pub fn display_resolution(resolution: &Resolution) {
  println!("{}", "=== Top Similar Incidents ===".blue().bold());
  match resolution.notice() {
    Some(notice) => println!("{}", notice.cyan()),
    None => {
      for line in match_table(&resolution.matches) {
        println!("{line}");
      }
    }
  }
  println!();

  println!("{}", "=== AI-Generated Recommended Resolution ===".green().bold());
  for line in resolution.recommendation.as_str().lines() {
    println!("{}", line.trim_end());
  }
}

/// Print a non-fatal warning to stderr
pub fn display_warning(message: &str) {
  eprintln!("{} {}", "[warn]".yellow().bold(), message);
}
