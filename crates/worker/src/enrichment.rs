use std::time::Duration;

use cortex_ai::{CompleteOptions, Provider};
use cortex_core::Store;
use cortex_entities::fact;
use cortex_shared::{AppError, ExtractionMethod, FactType};
use serde::Deserialize;

/// `EnrichFacts` tuning (spec §4.4.1).
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
  pub timeout: Duration,
  pub max_chunk_chars: usize,
  pub max_existing_facts: usize,
}

impl Default for EnrichmentConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(180),
      max_chunk_chars: 3000,
      max_existing_facts: 30,
    }
  }
}

const SYSTEM_PROMPT: &str = "You find facts a rule-based extractor missed in a chunk of text. \
You are given the chunk and the facts already extracted from it. Propose only NEW facts; never \
repeat or rephrase an existing one. Respond as JSON: {\"facts\": [{\"subject\":\"\", \
\"predicate\":\"\", \"object\":\"\", \"fact_type\":\"kv|relationship|preference|temporal|identity|\
location|decision|state|config\", \"confidence\": 0.0, \"source_quote\":\"\"}]}";

#[derive(Debug, Deserialize)]
struct EnrichmentResponse {
  facts: Vec<EnrichedFact>,
}

#[derive(Debug, Deserialize, Clone)]
struct EnrichedFact {
  subject: String,
  predicate: String,
  object: String,
  fact_type: String,
  confidence: f64,
  source_quote: String,
}

/// Truncates `text` to at most `max_chars`, cutting at the last word boundary
/// rather than mid-word (spec §4.4.1: "chunk truncated to 3000 chars at word
/// boundary").
fn truncate_at_word_boundary(text: &str, max_chars: usize) -> &str {
  if text.len() <= max_chars {
    return text;
  }

  let mut boundary = max_chars;
  while boundary > 0 && !text.is_char_boundary(boundary) {
    boundary -= 1;
  }
  match text[..boundary].rfind(char::is_whitespace) {
    Some(last_space) => &text[..last_space],
    None => &text[..boundary],
  }
}

/// Rejects a candidate that duplicates any existing fact under spec §4.4.1's
/// three containment rules: exact triple match; same subject+predicate with
/// object containment either way; same subject with containment on both
/// predicate and object.
fn is_duplicate(candidate: &EnrichedFact, existing: &[fact::Model]) -> bool {
  let subject = candidate.subject.to_lowercase();
  let predicate = candidate.predicate.to_lowercase();
  let object = candidate.object.to_lowercase();

  existing.iter().any(|f| {
    let f_subject = f.subject.to_lowercase();
    let f_predicate = f.predicate.to_lowercase();
    let f_object = f.object.to_lowercase();

    if subject == f_subject && predicate == f_predicate && object == f_object {
      return true;
    }

    if subject == f_subject && predicate == f_predicate && contains_either_way(&object, &f_object) {
      return true;
    }

    if subject == f_subject
      && contains_either_way(&predicate, &f_predicate)
      && contains_either_way(&object, &f_object)
    {
      return true;
    }

    false
  })
}

fn contains_either_way(a: &str, b: &str) -> bool {
  a.contains(b) || b.contains(a)
}

/// Runs enrichment for one memory's chunk against its already-stored facts,
/// adding whatever the LLM finds that survives duplicate suppression.
/// Additive only: never modifies an existing fact (spec §4.4.1).
pub async fn enrich_memory(
  store: &Store,
  provider: &dyn Provider,
  memory_id: i64,
  config: &EnrichmentConfig,
) -> Result<usize, AppError> {
  let memory = store.get_memory(memory_id).await?;
  let existing = store.get_facts_by_memory_ids(&[memory_id]).await?;

  let chunk = truncate_at_word_boundary(&memory.content, config.max_chunk_chars);
  let sample: Vec<&fact::Model> = existing.iter().take(config.max_existing_facts).collect();

  let facts_block = sample
    .iter()
    .map(|f| format!("- {}: {} -> {}", f.subject, f.predicate, f.object))
    .collect::<Vec<_>>()
    .join("\n");

  let prompt = format!("Chunk:\n{chunk}\n\nExisting facts:\n{facts_block}");

  let completion = tokio::time::timeout(
    config.timeout,
    provider.complete(&prompt, &CompleteOptions::json().with_system(SYSTEM_PROMPT)),
  )
  .await;

  let Ok(Ok(raw)) = completion else {
    return Ok(0);
  };

  let Ok(parsed) = cortex_ai::parse_llm_json::<EnrichmentResponse>(&raw) else {
    return Ok(0);
  };

  let mut added = 0;
  for candidate in parsed.facts {
    if is_duplicate(&candidate, &existing) {
      continue;
    }

    let Ok(fact_type) = candidate.fact_type.parse::<FactType>() else {
      continue;
    };

    store
      .add_fact(cortex_core::store::NewFact {
        memory_id,
        subject: candidate.subject,
        predicate: candidate.predicate,
        object: candidate.object,
        fact_type,
        confidence: candidate.confidence.clamp(0.0, 1.0),
        decay_rate: None,
        extraction_method: ExtractionMethod::LlmEnrich,
        agent_id: None,
        source_quote: candidate.source_quote,
      })
      .await?;
    added += 1;
  }

  Ok(added)
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use cortex_core::store::NewMemory;
  use cortex_migration::{Migrator, MigratorTrait};
  use sea_orm::Database;

  use super::*;

  async fn test_store() -> Store {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Store::new(db)
  }

  struct StubProvider {
    response: String,
  }

  #[async_trait]
  impl Provider for StubProvider {
    async fn complete(&self, _prompt: &str, _opts: &CompleteOptions) -> Result<String, AppError> {
      Ok(self.response.clone())
    }

    fn name(&self) -> &str {
      "stub"
    }
  }

  #[tokio::test]
  async fn adds_non_duplicate_facts() {
    let store = test_store().await;
    let memory_id = store
      .add_memory(NewMemory {
        content: "Broker: TradeStation. Also trades on Robinhood.".to_owned(),
        source_file: "notes.md".to_owned(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap();

    let provider = StubProvider {
      response: "{\"facts\": [{\"subject\": \"Trading\", \"predicate\": \"secondary_broker\", \
                 \"object\": \"Robinhood\", \"fact_type\": \"kv\", \"confidence\": 0.8, \
                 \"source_quote\": \"Also trades on Robinhood.\"}]}"
        .to_owned(),
    };

    let added = enrich_memory(&store, &provider, memory_id, &EnrichmentConfig::default())
      .await
      .unwrap();
    assert_eq!(added, 1);
  }

  #[test]
  fn truncates_at_word_boundary() {
    let text = "one two three four";
    assert_eq!(truncate_at_word_boundary(text, 10), "one two");
  }

  #[test]
  fn detects_exact_triple_duplicate() {
    let existing = vec![fact::Model {
      id: 1,
      memory_id: 1,
      subject: "Alice".to_owned(),
      predicate: "likes".to_owned(),
      object: "Coffee".to_owned(),
      fact_type: "kv".to_owned(),
      confidence: 0.9,
      decay_rate: 0.01,
      last_reinforced: chrono::Utc::now(),
      extraction_method: "rules".to_owned(),
      agent_id: None,
      created_at: chrono::Utc::now(),
      superseded_by: None,
      source_quote: "Alice likes coffee".to_owned(),
    }];

    let candidate = EnrichedFact {
      subject: "alice".to_owned(),
      predicate: "likes".to_owned(),
      object: "coffee".to_owned(),
      fact_type: "kv".to_owned(),
      confidence: 0.8,
      source_quote: String::new(),
    };

    assert!(is_duplicate(&candidate, &existing));
  }
}
