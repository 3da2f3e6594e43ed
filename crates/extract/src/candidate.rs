use cortex_shared::{ExtractionMethod, FactType};
use serde::{Deserialize, Serialize};

/// A fact produced by the extraction pipeline before it is persisted as a
/// `cortex_entities::fact::Model` (spec §4.1). Carries everything `AddFact`
/// needs plus the fields the governor scores on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateFact {
  pub subject: String,
  pub predicate: String,
  pub object: String,
  pub fact_type: FactType,
  pub confidence: f64,
  pub extraction_method: ExtractionMethod,
  pub source_quote: String,
}

impl CandidateFact {
  pub fn dedup_key(&self) -> String {
    format!(
      "{}|{}|{}",
      self.subject.to_lowercase(),
      self.predicate.to_lowercase(),
      self.object.to_lowercase()
    )
  }

  #[must_use]
  pub fn decay_rate(&self) -> f64 {
    self.fact_type.default_decay_rate()
  }
}
