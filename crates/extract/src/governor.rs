use std::collections::HashMap;

use cortex_shared::{ExtractionMethod, FactType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::CandidateFact;

/// Quality Governor configuration (spec §4.2). Both the "Default" and
/// "AutoCapture" profiles from the spec, plus custom values, are expressed
/// through this struct rather than hard-coded — the spec leaves the
/// authoritative thresholds to external configuration.
#[derive(Debug, Clone, Copy)]
pub struct GovernorConfig {
  pub max_facts_per_memory: usize,
  pub min_object_length: usize,
  pub min_predicate_length: usize,
  pub drop_markdown_junk: bool,
  pub drop_generic_subjects: bool,
}

impl GovernorConfig {
  #[must_use]
  pub const fn default_profile() -> Self {
    Self {
      max_facts_per_memory: 20,
      min_object_length: 2,
      min_predicate_length: 4,
      drop_markdown_junk: true,
      drop_generic_subjects: true,
    }
  }

  #[must_use]
  pub const fn auto_capture_profile() -> Self {
    Self {
      max_facts_per_memory: 15,
      min_object_length: 3,
      min_predicate_length: 3,
      drop_markdown_junk: true,
      drop_generic_subjects: true,
    }
  }
}

const GENERIC_SUBJECTS: &[&str] = &[
  "conversation summary",
  "conversation capture",
  "summary",
  "untitled",
  "unknown",
  "(unknown)",
  "none",
  "n/a",
  "assistant",
  "user",
  "system",
];

static MARKDOWN_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*_|#:\s-]+$").unwrap());
static GIT_HASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[0-9a-f]{6,}\b").unwrap());
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d").unwrap());
static URL_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://|www\.").unwrap());
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[.+\]\(.+\)$").unwrap());
static PROMINENT_EMOJI: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}]").unwrap());

const GENERIC_REGEX_PREDICATES: &[&str] = &["amount", "url", "date", "value"];

/// Runs the full governor pipeline: drop noise, dedup, score, sort, cap.
#[must_use]
pub fn govern(facts: Vec<CandidateFact>, config: &GovernorConfig) -> Vec<CandidateFact> {
  let survivors: Vec<CandidateFact> = facts.into_iter().filter(|f| !is_noise(f, config)).collect();
  let deduped = dedup_keep_highest_confidence(survivors);
  let mut scored: Vec<(f64, CandidateFact)> = deduped
    .into_iter()
    .map(|f| (score(&f), f))
    .collect();

  scored.sort_by(|a, b| {
    b.0
      .partial_cmp(&a.0)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| a.1.subject.cmp(&b.1.subject))
  });

  let capped = if config.max_facts_per_memory == 0 {
    scored
  } else {
    scored.into_iter().take(config.max_facts_per_memory).collect()
  };

  capped.into_iter().map(|(_, f)| f).collect()
}

fn is_noise(fact: &CandidateFact, config: &GovernorConfig) -> bool {
  let object = fact.object.trim();
  let predicate = fact.predicate.trim();
  let subject = fact.subject.trim();

  if object.is_empty() || predicate.is_empty() {
    return true;
  }
  if object.chars().count() < config.min_object_length {
    return true;
  }
  if predicate.chars().count() < config.min_predicate_length {
    return true;
  }

  if config.drop_markdown_junk && (MARKDOWN_JUNK.is_match(predicate) || MARKDOWN_JUNK.is_match(object)) {
    return true;
  }

  if config.drop_generic_subjects && is_generic_subject(subject) {
    return true;
  }

  if object.eq_ignore_ascii_case(predicate) {
    return true;
  }

  if predicate.chars().all(|c| c.is_numeric() || c.is_ascii_punctuation()) {
    return true;
  }

  if config.drop_markdown_junk && object.chars().all(|c| "*_|-: ".contains(c)) {
    return true;
  }

  if GENERIC_REGEX_PREDICATES.contains(&predicate.to_lowercase().as_str()) {
    return true;
  }

  if URL_LIKE.is_match(object) || URL_LIKE.is_match(predicate) {
    return true;
  }
  if GIT_HASH.is_match(predicate) {
    return true;
  }
  if NUMERIC_PREFIX.is_match(subject) {
    return true;
  }
  if predicate.contains('|') {
    return true;
  }
  if subject.starts_with("> ") || subject.starts_with("- ") {
    return true;
  }
  if predicate.starts_with("- ") || predicate.starts_with("* ") {
    return true;
  }
  if MARKDOWN_LINK.is_match(subject) {
    return true;
  }

  false
}

fn is_generic_subject(subject: &str) -> bool {
  let lower = subject.to_lowercase();

  if GENERIC_SUBJECTS.contains(&lower.as_str()) {
    return true;
  }
  if lower.starts_with("conversation ") || lower.starts_with("send this to ") {
    return true;
  }
  if subject.chars().count() > 50 {
    return true;
  }
  if PROMINENT_EMOJI.is_match(subject) && subject.chars().count() > 30 {
    return true;
  }

  false
}

fn dedup_keep_highest_confidence(facts: Vec<CandidateFact>) -> Vec<CandidateFact> {
  let mut best: HashMap<String, CandidateFact> = HashMap::new();

  for fact in facts {
    let key = fact.dedup_key();
    match best.get(&key) {
      Some(existing) if existing.confidence >= fact.confidence => {}
      _ => {
        best.insert(key, fact);
      }
    }
  }

  best.into_values().collect()
}

fn type_boost(fact_type: FactType) -> f64 {
  match fact_type {
    FactType::Identity => 0.15,
    FactType::Decision => 0.12,
    FactType::Relationship => 0.12,
    FactType::Preference => 0.10,
    FactType::Location => 0.08,
    FactType::State => 0.05,
    FactType::Temporal => 0.02,
    FactType::Kv | FactType::Config => 0.0,
  }
}

fn score(fact: &CandidateFact) -> f64 {
  let object_len = fact.object.chars().count();
  let subject_len = fact.subject.chars().count();
  let predicate_len = fact.predicate.chars().count();

  let short_object_penalty = if object_len < 5 {
    0.10
  } else if object_len < 10 {
    0.05
  } else {
    0.0
  };

  let subject_penalty = if subject_len == 0 {
    0.15
  } else if subject_len < 3 {
    0.08
  } else {
    0.0
  };

  let short_predicate_penalty = if predicate_len < 3 { 0.08 } else { 0.0 };

  let llm_boost = if fact.extraction_method == ExtractionMethod::Llm { 0.05 } else { 0.0 };

  (fact.confidence + type_boost(fact.fact_type) - short_object_penalty - subject_penalty - short_predicate_penalty
    + llm_boost)
    .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fact(subject: &str, predicate: &str, object: &str, confidence: f64) -> CandidateFact {
    CandidateFact {
      subject: subject.to_owned(),
      predicate: predicate.to_owned(),
      object: object.to_owned(),
      fact_type: FactType::Kv,
      confidence,
      extraction_method: ExtractionMethod::Rules,
      source_quote: format!("{predicate}: {object}"),
    }
  }

  #[test]
  fn caps_at_max_facts_per_memory() {
    let facts: Vec<CandidateFact> = (0..20)
      .map(|i| fact("Trading Setup", &format!("key{i}"), &format!("value{i}"), 0.5 + i as f64 * 0.02))
      .collect();

    let config = GovernorConfig {
      max_facts_per_memory: 5,
      ..GovernorConfig::default_profile()
    };
    let governed = govern(facts, &config);

    assert_eq!(governed.len(), 5);
    assert!(governed[0].confidence >= governed[1].confidence);
  }

  #[test]
  fn drops_short_fields() {
    let facts = vec![fact("Subject", "a", "b", 0.9)];
    let governed = govern(facts, &GovernorConfig::default_profile());
    assert!(governed.is_empty());
  }

  #[test]
  fn drops_generic_subject() {
    let facts = vec![fact("unknown", "broker", "TradeStation", 0.9)];
    let governed = govern(facts, &GovernorConfig::default_profile());
    assert!(governed.is_empty());
  }

  #[test]
  fn drops_circular_fact() {
    let facts = vec![fact("Subject", "broker", "broker", 0.9)];
    let governed = govern(facts, &GovernorConfig::default_profile());
    assert!(governed.is_empty());
  }

  #[test]
  fn dedup_keeps_highest_confidence() {
    let facts = vec![
      fact("Subject", "broker", "TradeStation", 0.5),
      fact("Subject", "broker", "TradeStation", 0.9),
    ];
    let governed = govern(facts, &GovernorConfig::default_profile());
    assert_eq!(governed.len(), 1);
    assert_eq!(governed[0].confidence, 0.9);
  }

  #[test]
  fn idempotent_on_repeated_application() {
    let facts = vec![fact("Subject", "broker", "TradeStation", 0.9)];
    let once = govern(facts, &GovernorConfig::default_profile());
    let twice = govern(once.clone(), &GovernorConfig::default_profile());
    assert_eq!(once, twice);
  }
}
