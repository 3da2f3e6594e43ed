use std::collections::HashSet;

use cortex_ai::Provider;

use crate::candidate::CandidateFact;
use crate::governor::{GovernorConfig, govern};
use crate::kv::extract_kv;
use crate::nl::extract_nl;
use crate::regex_scan::scan_literals;
use crate::scaffold::strip_scaffold;
use crate::subject::infer_subject;

/// Options recognized by `Extract` (spec §4.1 contract).
#[derive(Debug, Clone, Default)]
pub struct ExtractMetadata<'a> {
  pub source_file: &'a str,
  pub source_section: Option<&'a str>,
  pub format: Option<&'a str>,
}

impl<'a> ExtractMetadata<'a> {
  fn is_auto_capture(&self) -> bool {
    self.source_file.contains("auto-capture") || self.source_file.contains("auto_capture")
  }
}

/// `Extract(text, metadata) -> [Fact]` (spec §4.1). Runs the rule stages
/// synchronously; LLM extraction (stage 7) is a separate async step run by
/// `extract_async` because rule extraction must never depend on network I/O.
#[must_use]
pub fn extract_rules(text: &str, metadata: &ExtractMetadata<'_>) -> Vec<CandidateFact> {
  let is_auto_capture = metadata.is_auto_capture();

  let stripped = if is_auto_capture { strip_scaffold(text) } else { text.to_owned() };

  let subject = infer_subject(metadata.source_section, metadata.source_file, is_auto_capture);

  let mut facts = Vec::new();

  for line in stripped.lines() {
    if line.trim().is_empty() {
      continue;
    }

    if let Some(fact) = extract_kv(line, &subject, is_auto_capture) {
      facts.push(fact);
    } else if let Some(fact) = extract_nl(line, &subject) {
      facts.push(fact);
    }

    facts.extend(scan_literals(line, &subject));
  }

  dedup_first_occurrence(facts)
}

/// Runs the rule stages plus, when a provider is supplied, LLM extraction
/// (stage 7), then dedup (stage 8) and the governor (stage 9). Never fails on
/// LLM issues — degrades to rule-only output per spec §4.1.
pub async fn extract(
  text: &str,
  metadata: &ExtractMetadata<'_>,
  provider: Option<&dyn Provider>,
) -> Vec<CandidateFact> {
  let is_auto_capture = metadata.is_auto_capture();
  let mut facts = extract_rules(text, metadata);

  if let Some(provider) = provider {
    let subject = infer_subject(metadata.source_section, metadata.source_file, is_auto_capture);
    let llm_facts = crate::llm::extract_with_llm(provider, text, &subject).await;
    facts.extend(llm_facts);
    facts = dedup_first_occurrence(facts);
  }

  let config = if is_auto_capture {
    GovernorConfig::auto_capture_profile()
  } else {
    GovernorConfig::default_profile()
  };

  govern(facts, &config)
}

fn dedup_first_occurrence(facts: Vec<CandidateFact>) -> Vec<CandidateFact> {
  let mut seen = HashSet::new();
  facts
    .into_iter()
    .filter(|f| seen.insert(f.dedup_key()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_markdown_trading_setup() {
    let text = "# Trading Setup\n**Broker:** TradeStation\n- Strategy: QQQ 0DTE options\n- Risk tolerance: Aggressive\nContact: john@trader.com\nStarted: 2026-01-15\nBudget: $10,000";
    let metadata = ExtractMetadata {
      source_file: "notes/trading.md",
      source_section: Some("Trading Setup"),
      format: Some("markdown"),
    };

    let facts = extract_rules(text, &metadata);

    assert!(facts.len() >= 5, "expected at least 5 facts, got {}", facts.len());
    assert!(facts.iter().any(|f| f.predicate == "broker" && f.object == "TradeStation"));
    assert!(facts.iter().any(|f| f.predicate == "strategy" && f.object == "QQQ 0DTE options"));
    assert!(facts.iter().any(|f| f.predicate == "email" && f.object == "john@trader.com"));
    assert!(facts.iter().any(|f| f.fact_type == cortex_shared::FactType::Kv));
    assert!(facts.iter().any(|f| f.fact_type == cortex_shared::FactType::Temporal));
    assert!(facts.iter().any(|f| f.fact_type == cortex_shared::FactType::Identity));
  }

  #[test]
  fn deduplicates_repeated_lines() {
    let text = "Broker: TradeStation\nBroker: TradeStation";
    let metadata = ExtractMetadata {
      source_file: "notes.md",
      source_section: Some("Trading"),
      format: None,
    };

    let facts = extract_rules(text, &metadata);
    assert_eq!(facts.iter().filter(|f| f.predicate == "broker").count(), 1);
  }
}
