use cortex_shared::{ExtractionMethod, FactType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::CandidateFact;

const NOISY_AUTO_CAPTURE_KEYS: &[&str] = &[
  "conversationlabel",
  "groupsubject",
  "groupchannel",
  "groupspace",
  "sender",
  "label",
  "username",
  "tag",
  "currenttime",
  "messageid",
  "assistant",
  "user",
  "system",
];

static BULLETED_BOLD_COLON: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\s*[-*]\s*\*\*\s*([^*:]+)\s*:?\s*\*\*\s*:?\s*(.+)$").unwrap());
static BOLD_COLON: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\s*\*\*\s*([^*:]+)\s*:?\s*\*\*\s*:?\s*(.+)$").unwrap());
static BULLETED_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*]\s*([^:]{1,80}):\s*(.+)$").unwrap());
static BARE_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([^:]{1,80}):\s*(.+)$").unwrap());
static ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(.{1,80}?)\s*→\s*(.+)$").unwrap());
static EQUALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(.{1,80}?)\s*=\s*(.+)$").unwrap());
static EM_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(.{1,80}?)\s+—\s+(.+)$").unwrap());

static TRANSCRIPT_MARKER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)<cortex-memories>|\(untrusted metadata\)|\[message_id:|^(assistant|user|system):").unwrap());

/// Stage 3: key/value extraction (spec §4.1.3). Tries each pattern in priority
/// order, first match wins; returns `None` if the line is dropped by a guard
/// or matches nothing.
#[must_use]
pub fn extract_kv(line: &str, subject: &str, is_auto_capture: bool) -> Option<CandidateFact> {
  let trimmed = line.trim();
  if trimmed.starts_with('{') || trimmed.starts_with('}') {
    return None;
  }

  let (raw_key, raw_value, matched_bold_variant) = match_pattern(trimmed, is_auto_capture)?;

  let key = clean_predicate(raw_key.trim());
  let value = raw_value.trim().to_owned();

  if key.len() > 80 || key.matches(' ').count() > 8 || key.contains('{') || key.contains('}') {
    return None;
  }
  if value.is_empty() || key.is_empty() {
    return None;
  }

  if is_transcript_like(line) && NOISY_AUTO_CAPTURE_KEYS.contains(&key.to_lowercase().as_str()) {
    return None;
  }

  if is_auto_capture {
    if !matched_bold_variant {
      return None;
    }
    if key.eq_ignore_ascii_case("name") {
      return None;
    }
  }

  let fact_type = infer_fact_type(&key, &value, line);
  let confidence = if fact_type == FactType::Kv { 0.9 } else { 0.88 };

  Some(CandidateFact {
    subject: subject.to_owned(),
    predicate: key,
    object: value,
    fact_type,
    confidence,
    extraction_method: ExtractionMethod::Rules,
    source_quote: line.to_owned(),
  })
}

/// Returns `(key, value, matched_bold_variant)`.
fn match_pattern(line: &str, _is_auto_capture: bool) -> Option<(String, String, bool)> {
  if let Some(c) = BULLETED_BOLD_COLON.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), true));
  }
  if let Some(c) = BOLD_COLON.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), true));
  }
  if let Some(c) = BULLETED_COLON.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), false));
  }
  if let Some(c) = BARE_COLON.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), false));
  }
  if let Some(c) = ARROW.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), false));
  }
  if let Some(c) = EQUALS.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), false));
  }
  if let Some(c) = EM_DASH.captures(line) {
    return Some((c[1].to_owned(), c[2].to_owned(), false));
  }
  None
}

fn is_transcript_like(line: &str) -> bool {
  TRANSCRIPT_MARKER.is_match(line)
}

fn clean_predicate(raw: &str) -> String {
  raw
    .trim_start_matches('#')
    .trim()
    .trim_matches('*')
    .trim()
    .to_lowercase()
}

/// `inferFactType` (spec §4.1.3): keyword lookup over `key + " " + value + " " + line`.
fn infer_fact_type(key: &str, value: &str, line: &str) -> FactType {
  let haystack = format!("{key} {value} {line}").to_lowercase();

  let has_any = |words: &[&str]| words.iter().any(|w| haystack.contains(w));

  if has_any(&["prefers", "preference", "likes", "dislikes", "wants", "favorite"]) {
    FactType::Preference
  } else if has_any(&["decided", "decision", "chose", "selected", "approved"]) {
    FactType::Decision
  } else if has_any(&[
    "engaged to",
    "married to",
    "reports to",
    "fiancée",
    "spouse",
    "partner",
    "manager",
  ]) {
    FactType::Relationship
  } else if has_any(&["status", "state", "running", "blocked", "idle", "online", "offline"]) {
    FactType::State
  } else if has_any(&["location", "address", "city", "country", "venue", "located in"]) {
    FactType::Location
  } else {
    FactType::Kv
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_bold_colon() {
    let fact = extract_kv("**Broker:** TradeStation", "Trading Setup", false).unwrap();
    assert_eq!(fact.predicate, "broker");
    assert_eq!(fact.object, "TradeStation");
    assert_eq!(fact.fact_type, FactType::Kv);
  }

  #[test]
  fn extracts_bulleted_colon() {
    let fact = extract_kv("- Strategy: QQQ 0DTE options", "Trading Setup", false).unwrap();
    assert_eq!(fact.predicate, "strategy");
    assert_eq!(fact.object, "QQQ 0DTE options");
  }

  #[test]
  fn infers_preference_type() {
    let fact = extract_kv("Preference: dark roast coffee", "Me", false).unwrap();
    assert_eq!(fact.fact_type, FactType::Preference);
  }

  #[test]
  fn auto_capture_requires_bold_variant() {
    assert!(extract_kv("Strategy: QQQ 0DTE options", "Trading Setup", true).is_none());
    assert!(extract_kv("**Strategy:** QQQ 0DTE options", "Trading Setup", true).is_some());
  }

  #[test]
  fn auto_capture_drops_name_key() {
    assert!(extract_kv("**Name:** Bob", "Profile", true).is_none());
  }

  #[test]
  fn rejects_brace_lines() {
    assert!(extract_kv("{\"sender\": \"bob\"}", "Chat", false).is_none());
  }
}
