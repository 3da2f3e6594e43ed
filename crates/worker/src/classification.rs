use cortex_ai::{CompleteOptions, Provider};
use cortex_core::Store;
use cortex_entities::fact;
use cortex_shared::{AppError, FactType};
use serde::Deserialize;

use crate::concurrency::chunked;

/// `ClassifyFacts` tuning (spec §4.4.2).
#[derive(Debug, Clone)]
pub struct ClassificationConfig {
  pub batch_size: usize,
  pub min_confidence: f64,
}

impl Default for ClassificationConfig {
  fn default() -> Self {
    Self {
      batch_size: 50,
      min_confidence: 0.8,
    }
  }
}

#[derive(Debug, Default)]
pub struct ClassificationSummary {
  pub reclassified: usize,
  pub errors: usize,
}

const SYSTEM_PROMPT: &str = "You classify loosely-typed facts into a fixed taxonomy. Allowed \
types: kv, relationship, preference, temporal, identity, location, decision, state, config. \
Respond as JSON: {\"results\": [{\"id\": 0, \"type\": \"...\", \"confidence\": 0.0}]}";

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
  results: Vec<ClassificationItem>,
}

#[derive(Debug, Deserialize)]
struct ClassificationItem {
  id: i64,
  #[serde(rename = "type")]
  fact_type: String,
  confidence: f64,
}

fn build_prompt(batch: &[fact::Model]) -> String {
  let lines: Vec<String> = batch
    .iter()
    .map(|f| format!("- id={} subject=\"{}\" predicate=\"{}\" object=\"{}\"", f.id, f.subject, f.predicate, f.object))
    .collect();
  format!("Facts:\n{}", lines.join("\n"))
}

/// Reclassifies `facts` (typically typed `kv`) in batches of
/// `config.batch_size`. Per spec §4.4.2: a returned type must belong to the
/// allowed set, confidence must clear `min_confidence`, and a fact whose type
/// is already correct is left untouched. Per-batch errors are counted, never
/// fatal.
pub async fn classify_facts(
  store: &Store,
  provider: &dyn Provider,
  facts: Vec<fact::Model>,
  config: &ClassificationConfig,
) -> Result<ClassificationSummary, AppError> {
  let mut summary = ClassificationSummary::default();

  for batch in chunked(facts, config.batch_size) {
    let prompt = build_prompt(&batch);

    let raw = match provider.complete(&prompt, &CompleteOptions::json().with_system(SYSTEM_PROMPT)).await {
      Ok(raw) => raw,
      Err(_) => {
        summary.errors += 1;
        continue;
      }
    };

    let parsed: Result<ClassificationResponse, _> = cortex_ai::parse_llm_json(&raw);
    let Ok(parsed) = parsed else {
      summary.errors += 1;
      continue;
    };

    for item in parsed.results {
      let Some(original) = batch.iter().find(|f| f.id == item.id) else {
        summary.errors += 1;
        continue;
      };

      let Ok(new_type) = item.fact_type.parse::<FactType>() else {
        summary.errors += 1;
        continue;
      };

      if item.confidence < config.min_confidence {
        summary.errors += 1;
        continue;
      }

      if original.fact_type == new_type.to_string() {
        continue;
      }

      store.reclassify_fact(original.id, new_type).await?;
      summary.reclassified += 1;
    }
  }

  Ok(summary)
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use cortex_core::store::{NewFact, NewMemory};
  use cortex_migration::{Migrator, MigratorTrait};
  use cortex_shared::ExtractionMethod;
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

  async fn seed_kv_fact(store: &Store) -> i64 {
    let memory_id = store
      .add_memory(NewMemory {
        content: "content".to_owned(),
        source_file: "notes.md".to_owned(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap();

    store
      .add_fact(NewFact {
        memory_id,
        subject: "Alice".to_owned(),
        predicate: "works_at".to_owned(),
        object: "Acme".to_owned(),
        fact_type: FactType::Kv,
        confidence: 0.9,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "Alice works at Acme".to_owned(),
      })
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn reclassifies_high_confidence_result() {
    let store = test_store().await;
    let id = seed_kv_fact(&store).await;
    let facts = store.all_active_facts().await.unwrap();

    let provider = StubProvider {
      response: format!("{{\"results\": [{{\"id\": {id}, \"type\": \"identity\", \"confidence\": 0.95}}]}}"),
    };

    let summary = classify_facts(&store, &provider, facts, &ClassificationConfig::default())
      .await
      .unwrap();
    assert_eq!(summary.reclassified, 1);
    assert_eq!(summary.errors, 0);

    let updated = store.get_fact(id).await.unwrap();
    assert_eq!(updated.fact_type, "identity");
  }

  #[tokio::test]
  async fn rejects_low_confidence_result() {
    let store = test_store().await;
    let id = seed_kv_fact(&store).await;
    let facts = store.all_active_facts().await.unwrap();

    let provider = StubProvider {
      response: format!("{{\"results\": [{{\"id\": {id}, \"type\": \"identity\", \"confidence\": 0.5}}]}}"),
    };

    let summary = classify_facts(&store, &provider, facts, &ClassificationConfig::default())
      .await
      .unwrap();
    assert_eq!(summary.reclassified, 0);
    assert_eq!(summary.errors, 1);
  }
}
