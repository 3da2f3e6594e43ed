use cortex_shared::{ExtractionMethod, FactType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::CandidateFact;

const CONFIDENCE: f64 = 0.7;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());
static NL_DATE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b",
  )
  .unwrap()
});
static EMAIL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").unwrap());
static US_PHONE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\b\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}\b").unwrap());
static INTL_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\d{1,3}[-.\s]?\d{3,4}[-.\s]?\d{3,4}[-.\s]?\d{0,4}").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s)]+").unwrap());
static CURRENCY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\s?\d[\d,]*(?:\.\d{2})?").unwrap());

/// Stage 5: regex scan for structured literals (spec §4.1.5). Scans the whole
/// line for every literal kind rather than stopping at first match, since more
/// than one may appear in a line.
#[must_use]
pub fn scan_literals(line: &str, subject: &str) -> Vec<CandidateFact> {
  let mut facts = Vec::new();

  for m in ISO_DATE.find_iter(line) {
    facts.push(literal(subject, "date", m.as_str(), FactType::Temporal, line));
  }
  for m in NL_DATE.find_iter(line) {
    facts.push(literal(subject, "date", m.as_str(), FactType::Temporal, line));
  }
  for m in EMAIL.find_iter(line) {
    facts.push(literal(subject, "email", m.as_str(), FactType::Identity, line));
  }
  for m in US_PHONE.find_iter(line) {
    facts.push(literal(subject, "phone", m.as_str(), FactType::Identity, line));
  }
  for m in INTL_PHONE.find_iter(line) {
    facts.push(literal(subject, "phone", m.as_str(), FactType::Identity, line));
  }
  for m in URL.find_iter(line) {
    facts.push(literal(subject, "url", m.as_str(), FactType::Kv, line));
  }
  for m in CURRENCY.find_iter(line) {
    facts.push(literal(subject, "amount", m.as_str(), FactType::Kv, line));
  }

  facts
}

fn literal(subject: &str, predicate: &str, object: &str, fact_type: FactType, line: &str) -> CandidateFact {
  CandidateFact {
    subject: subject.to_owned(),
    predicate: predicate.to_owned(),
    object: object.to_owned(),
    fact_type,
    confidence: CONFIDENCE,
    extraction_method: ExtractionMethod::Rules,
    source_quote: line.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn finds_email() {
    let facts = scan_literals("Contact: john@trader.com", "Trading Setup");
    assert!(facts.iter().any(|f| f.predicate == "email" && f.object == "john@trader.com"));
  }

  #[test]
  fn finds_iso_date() {
    let facts = scan_literals("Started: 2026-01-15", "Trading Setup");
    assert!(facts.iter().any(|f| f.predicate == "date" && f.object == "2026-01-15"));
  }

  #[test]
  fn finds_currency() {
    let facts = scan_literals("Budget: $10,000", "Trading Setup");
    assert!(facts.iter().any(|f| f.predicate == "amount" && f.object == "$10,000"));
  }

  #[test]
  fn finds_url() {
    let facts = scan_literals("Docs: https://example.com/api", "Project");
    assert!(facts.iter().any(|f| f.predicate == "url"));
  }
}
