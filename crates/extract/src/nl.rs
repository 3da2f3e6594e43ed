use cortex_shared::{ExtractionMethod, FactType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::CandidateFact;

static PREFERENCE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)^(?P<subj>.+?)\s+(?P<verb>prefers|likes|dislikes|wants)\s+(?P<obj>.+)$").unwrap());
static DECISION: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^(?:we\s+)?(?:decided|chose|selected|approved)\s+(?:to\s+)?(?P<obj>.+)$").unwrap()
});
static ENGAGEMENT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)^(?P<subj>.+?)\s+is\s+engaged\s+to\s+(?P<obj>.+)$").unwrap());
static RELATIONAL: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^(?P<subj>.+?)\s+is\s+(?P<obj>.+?)'s\s+(?P<rel>fianc[ée]e|manager|partner|spouse|wife|husband)$").unwrap()
});
static STATE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^(?P<subj>.+?)\s+is\s+(?P<state>running|active|online|offline)(?P<port>\s+on\s+port\s+\d+)?\b.*$").unwrap()
});
static LOCATION: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^(?P<subj>.+?)\s+is\s+(?:at|in|located in|based in)\s+(?P<obj>.+)$").unwrap()
});

/// Characters whose presence on a line routes it to key/value extraction
/// instead (spec §4.1.4 "lines lacking `:`, `=`, `→`, `—`").
pub fn is_nl_candidate(line: &str) -> bool {
  !line.contains(':') && !line.contains('=') && !line.contains('→') && !line.contains('—')
}

/// Stage 4: natural-language sentence extraction (spec §4.1.4). Tries each
/// template in order, first match wins.
#[must_use]
pub fn extract_nl(line: &str, page_subject: &str) -> Option<CandidateFact> {
  let trimmed = line.trim();
  if trimmed.is_empty() || !is_nl_candidate(trimmed) {
    return None;
  }

  if let Some(c) = PREFERENCE.captures(trimmed) {
    return Some(fact(
      &c["subj"],
      &c["verb"].to_lowercase(),
      &c["obj"],
      FactType::Preference,
      0.86,
      line,
    ));
  }

  if let Some(c) = DECISION.captures(trimmed) {
    return Some(fact(page_subject, "decision", &c["obj"], FactType::Decision, 0.84, line));
  }

  if let Some(c) = ENGAGEMENT.captures(trimmed) {
    return Some(fact(
      &c["subj"],
      "engaged_to",
      &c["obj"],
      FactType::Relationship,
      0.9,
      line,
    ));
  }

  if let Some(c) = RELATIONAL.captures(trimmed) {
    return Some(fact(
      &c["subj"],
      &c["rel"].to_lowercase(),
      &c["obj"],
      FactType::Relationship,
      0.88,
      line,
    ));
  }

  if let Some(c) = STATE.captures(trimmed) {
    let object = format!("{}{}", &c["state"], c.name("port").map_or("", |m| m.as_str()));
    return Some(fact(&c["subj"], "status", object.trim(), FactType::State, 0.87, line));
  }

  if let Some(c) = LOCATION.captures(trimmed) {
    return Some(fact(
      &c["subj"],
      "location",
      &c["obj"],
      FactType::Location,
      0.86,
      line,
    ));
  }

  None
}

fn fact(
  subject: &str,
  predicate: &str,
  object: &str,
  fact_type: FactType,
  confidence: f64,
  line: &str,
) -> CandidateFact {
  CandidateFact {
    subject: subject.trim().to_owned(),
    predicate: predicate.trim().to_owned(),
    object: object.trim().to_owned(),
    fact_type,
    confidence,
    extraction_method: ExtractionMethod::Rules,
    source_quote: line.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_preference() {
    let fact = extract_nl("Alice prefers dark roast coffee", "Alice").unwrap();
    assert_eq!(fact.subject, "Alice");
    assert_eq!(fact.predicate, "prefers");
    assert_eq!(fact.object, "dark roast coffee");
    assert_eq!(fact.fact_type, FactType::Preference);
  }

  #[test]
  fn extracts_decision() {
    let fact = extract_nl("We decided to ship on Friday", "Project").unwrap();
    assert_eq!(fact.subject, "Project");
    assert_eq!(fact.predicate, "decision");
    assert_eq!(fact.object, "ship on Friday");
  }

  #[test]
  fn extracts_engagement() {
    let fact = extract_nl("Alice is engaged to Bob", "Alice").unwrap();
    assert_eq!(fact.predicate, "engaged_to");
    assert_eq!(fact.object, "Bob");
    assert_eq!(fact.fact_type, FactType::Relationship);
  }

  #[test]
  fn extracts_relational_template() {
    let fact = extract_nl("Alice is Bob's manager", "Alice").unwrap();
    assert_eq!(fact.predicate, "manager");
    assert_eq!(fact.object, "Bob");
  }

  #[test]
  fn extracts_state() {
    let fact = extract_nl("api-gateway is running on port 8080", "api-gateway").unwrap();
    assert_eq!(fact.predicate, "status");
    assert_eq!(fact.fact_type, FactType::State);
  }

  #[test]
  fn extracts_location() {
    let fact = extract_nl("The office is located in Austin", "The office").unwrap();
    assert_eq!(fact.predicate, "location");
    assert_eq!(fact.object, "Austin");
  }

  #[test]
  fn lines_with_colon_are_not_candidates() {
    assert!(extract_nl("Alice prefers: dark roast", "Alice").is_none());
  }
}
