use once_cell::sync::Lazy;
use regex::Regex;

const MAX_SUBJECT_LEN: usize = 50;
const SEPARATORS: &[&str] = &[" — ", " > ", " (", " – "];

static ISO_DATE_PREFIX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]?").unwrap());
static CLOCK_TIME_PREFIX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?\s*(am|pm|AM|PM)?\s*([A-Za-z]{2,4})?\s*").unwrap());
static CAPTURE_PREFIX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)^conversation capture\s*—\s*").unwrap());
static TRAILING_SUB: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*>\s*[^>]+$").unwrap());
static PARENTHESIZED_TIME: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\s*\([^)]*\d[^)]*\)\s*$").unwrap());
static LEADING_EMOJI: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}\x{FE0F}\s]+").unwrap()
});
static LEADING_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s*").unwrap());

/// Stage 2: subject inference (spec §4.1.2).
#[must_use]
pub fn infer_subject(source_section: Option<&str>, source_file: &str, is_auto_capture: bool) -> String {
  let mut candidate = source_section.unwrap_or("").trim().to_owned();

  candidate = ISO_DATE_PREFIX.replace(&candidate, "").into_owned();
  candidate = CLOCK_TIME_PREFIX.replace(&candidate, "").into_owned();
  candidate = CAPTURE_PREFIX.replace(&candidate, "").into_owned();
  candidate = TRAILING_SUB.replace(&candidate, "").into_owned();
  candidate = PARENTHESIZED_TIME.replace(&candidate, "").into_owned();
  candidate = LEADING_EMOJI.replace(&candidate, "").into_owned();
  candidate = LEADING_HEADER.replace(&candidate, "").into_owned();
  candidate = candidate.trim().to_owned();

  if is_auto_capture && candidate.chars().count() > MAX_SUBJECT_LEN {
    candidate = cut_at_separator(&candidate);
  }

  if candidate.is_empty() {
    candidate = filename_stem(source_file);
  }

  truncate_at_word_boundary(&candidate, MAX_SUBJECT_LEN)
}

fn cut_at_separator(candidate: &str) -> String {
  let window = candidate
    .char_indices()
    .nth(MAX_SUBJECT_LEN)
    .map_or(candidate.len(), |(idx, _)| idx);
  let prefix = &candidate[..window];

  let cut = SEPARATORS
    .iter()
    .filter_map(|sep| prefix.find(sep))
    .min();

  match cut {
    Some(idx) => candidate[..idx].to_owned(),
    None => candidate.to_owned(),
  }
}

fn truncate_at_word_boundary(candidate: &str, max_len: usize) -> String {
  if candidate.chars().count() <= max_len {
    return candidate.to_owned();
  }

  let truncated: String = candidate.chars().take(max_len).collect();
  match truncated.rfind(char::is_whitespace) {
    Some(idx) if idx > 0 => truncated[..idx].trim_end().to_owned(),
    _ => truncated,
  }
}

fn filename_stem(source_file: &str) -> String {
  std::path::Path::new(source_file)
    .file_stem()
    .and_then(|s| s.to_str())
    .unwrap_or("")
    .to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_iso_date_prefix() {
    assert_eq!(
      infer_subject(Some("2026-01-15 Trading Setup"), "", false),
      "Trading Setup"
    );
  }

  #[test]
  fn strips_capture_prefix() {
    assert_eq!(
      infer_subject(Some("Conversation Capture — Daily Standup"), "", false),
      "Daily Standup"
    );
  }

  #[test]
  fn falls_back_to_filename_stem_when_empty() {
    assert_eq!(infer_subject(Some(""), "notes/trading-setup.md", false), "trading-setup");
  }

  #[test]
  fn caps_length_at_fifty() {
    let long = "a".repeat(80);
    let subject = infer_subject(Some(&long), "", false);
    assert!(subject.chars().count() <= 50);
  }

  #[test]
  fn cuts_auto_capture_subject_at_separator_within_window() {
    let long_prefix = "x".repeat(40);
    let candidate = format!("{long_prefix} — trailing detail that pushes past fifty chars");
    let subject = infer_subject(Some(&candidate), "", true);
    assert_eq!(subject, long_prefix);
  }
}
