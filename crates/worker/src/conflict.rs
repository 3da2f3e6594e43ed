use cortex_ai::{CompleteOptions, Provider};
use cortex_core::Store;
use cortex_entities::fact;
use cortex_shared::{AppError, ExtractionMethod, FactType};
use serde::Deserialize;

use crate::concurrency::{chunked, run_batched};

/// `ResolveConflictsLLM` tuning (spec §4.4.3).
#[derive(Debug, Clone)]
pub struct ConflictConfig {
  pub batch_size: usize,
  pub concurrency: usize,
  pub min_confidence: f64,
}

impl Default for ConflictConfig {
  fn default() -> Self {
    Self {
      batch_size: 5,
      concurrency: 5,
      min_confidence: 0.7,
    }
  }
}

#[derive(Debug, Default)]
pub struct ConflictSummary {
  pub superseded: usize,
  pub merged: usize,
  pub flagged: usize,
  pub errors: usize,
}

impl ConflictSummary {
  fn merge(mut self, other: Self) -> Self {
    self.superseded += other.superseded;
    self.merged += other.merged;
    self.flagged += other.flagged;
    self.errors += other.errors;
    self
  }
}

/// A pair of active facts sharing subject+predicate but disagreeing on object
/// (spec §4.4.3 input).
#[derive(Debug, Clone)]
pub struct ConflictPair {
  pub a: fact::Model,
  pub b: fact::Model,
}

/// Finds every pair of active facts with the same (subject, predicate),
/// case-insensitive, but a different object. This is the candidate set
/// `ResolveConflictsLLM` is run over.
#[must_use]
pub fn find_conflicts(facts: &[fact::Model]) -> Vec<ConflictPair> {
  let mut pairs = Vec::new();
  for i in 0..facts.len() {
    for j in (i + 1)..facts.len() {
      let a = &facts[i];
      let b = &facts[j];
      if a.subject.to_lowercase() == b.subject.to_lowercase()
        && a.predicate.to_lowercase() == b.predicate.to_lowercase()
        && a.object.to_lowercase() != b.object.to_lowercase()
      {
        pairs.push(ConflictPair { a: a.clone(), b: b.clone() });
      }
    }
  }
  pairs
}

const SYSTEM_PROMPT: &str = "You resolve conflicting facts about the same subject and predicate. \
For each pair, decide action in {supersede, merge, flag-human}, naming winner_id/loser_id, a \
reason, and a confidence. If merging, include merged_fact: {subject, predicate, object, \
fact_type, confidence}. Respond as JSON: {\"resolutions\": [{\"pair_index\": 0, \"action\": \
\"...\", \"winner_id\": 0, \"loser_id\": 0, \"reason\": \"...\", \"confidence\": 0.0, \
\"merged_fact\": null}]}";

#[derive(Debug, Deserialize)]
struct ConflictResponse {
  resolutions: Vec<Resolution>,
}

#[derive(Debug, Deserialize)]
struct Resolution {
  pair_index: usize,
  action: String,
  winner_id: i64,
  loser_id: i64,
  #[allow(dead_code)]
  reason: String,
  confidence: f64,
  merged_fact: Option<MergedFact>,
}

#[derive(Debug, Deserialize)]
struct MergedFact {
  subject: String,
  predicate: String,
  object: String,
  fact_type: String,
  confidence: f64,
}

fn build_prompt(batch: &[ConflictPair]) -> String {
  let lines: Vec<String> = batch
    .iter()
    .enumerate()
    .map(|(i, pair)| {
      format!(
        "- pair_index={i}: a(id={}, object=\"{}\", confidence={}) vs b(id={}, object=\"{}\", confidence={}), subject=\"{}\" predicate=\"{}\"",
        pair.a.id, pair.a.object, pair.a.confidence, pair.b.id, pair.b.object, pair.b.confidence, pair.a.subject, pair.a.predicate
      )
    })
    .collect();
  format!("Conflicting pairs:\n{}", lines.join("\n"))
}

async fn resolve_batch(store: &Store, provider: &dyn Provider, batch: Vec<ConflictPair>, min_confidence: f64) -> ConflictSummary {
  let mut summary = ConflictSummary::default();

  let prompt = build_prompt(&batch);
  let raw = match provider.complete(&prompt, &CompleteOptions::json().with_system(SYSTEM_PROMPT)).await {
    Ok(raw) => raw,
    Err(_) => {
      summary.errors += 1;
      return summary;
    }
  };

  let parsed: Result<ConflictResponse, _> = cortex_ai::parse_llm_json(&raw);
  let Ok(parsed) = parsed else {
    summary.errors += 1;
    return summary;
  };

  for resolution in parsed.resolutions {
    let Some(pair) = batch.get(resolution.pair_index) else {
      summary.errors += 1;
      continue;
    };

    // Confidence below the floor always forces human review, regardless of
    // the action the model proposed (spec §4.4.3 policy).
    let action = if resolution.confidence < min_confidence { "flag-human" } else { resolution.action.as_str() };

    match action {
      "supersede" => {
        if store.supersede_fact(resolution.loser_id, resolution.winner_id).await.is_ok() {
          summary.superseded += 1;
        } else {
          summary.errors += 1;
        }
      }
      "merge" => {
        let Some(merged) = &resolution.merged_fact else {
          summary.errors += 1;
          continue;
        };
        let fact_type = merged.fact_type.parse::<FactType>().unwrap_or(FactType::Kv);

        let merged_fact = cortex_core::store::NewFact {
          memory_id: pair.a.memory_id,
          subject: merged.subject.clone(),
          predicate: merged.predicate.clone(),
          object: merged.object.clone(),
          fact_type,
          confidence: merged.confidence.clamp(0.0, 1.0),
          decay_rate: None,
          extraction_method: ExtractionMethod::LlmEnrich,
          agent_id: None,
          source_quote: format!("merged from facts {} and {}", pair.a.id, pair.b.id),
        };

        if store.merge_facts(&[pair.a.id, pair.b.id], merged_fact).await.is_ok() {
          summary.merged += 1;
        } else {
          summary.errors += 1;
        }
      }
      "flag-human" => summary.flagged += 1,
      _ => summary.errors += 1,
    }
  }

  summary
}

/// Resolves every conflicting pair via the LLM, in batches of
/// `config.batch_size` run with up to `config.concurrency` in flight (spec
/// §4.4.3).
pub async fn resolve_conflicts<P>(store: &Store, provider: std::sync::Arc<P>, pairs: Vec<ConflictPair>, config: &ConflictConfig) -> ConflictSummary
where
  P: Provider + 'static,
{
  let batches = chunked(pairs, config.batch_size);
  let store = std::sync::Arc::new(store.clone());

  let min_confidence = config.min_confidence;
  let results = run_batched(batches, config.concurrency, move |batch| {
    let store = std::sync::Arc::clone(&store);
    let provider = std::sync::Arc::clone(&provider);
    async move { resolve_batch(&store, provider.as_ref(), batch, min_confidence).await }
  })
  .await;

  results.into_iter().fold(ConflictSummary::default(), ConflictSummary::merge)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use async_trait::async_trait;
  use cortex_core::store::{NewFact, NewMemory};
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

  async fn seed_pair(store: &Store) -> ConflictPair {
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

    let a_id = store
      .add_fact(NewFact {
        memory_id,
        subject: "Alice".to_owned(),
        predicate: "role".to_owned(),
        object: "Engineer".to_owned(),
        fact_type: FactType::Kv,
        confidence: 0.6,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "Alice is an engineer".to_owned(),
      })
      .await
      .unwrap();

    let b_id = store
      .add_fact(NewFact {
        memory_id,
        subject: "Alice".to_owned(),
        predicate: "role".to_owned(),
        object: "Manager".to_owned(),
        fact_type: FactType::Kv,
        confidence: 0.9,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "Alice is a manager now".to_owned(),
      })
      .await
      .unwrap();

    ConflictPair {
      a: store.get_fact(a_id).await.unwrap(),
      b: store.get_fact(b_id).await.unwrap(),
    }
  }

  #[test]
  fn finds_conflicting_pairs() {
    let facts = vec![
      fact::Model {
        id: 1,
        memory_id: 1,
        subject: "Alice".to_owned(),
        predicate: "role".to_owned(),
        object: "Engineer".to_owned(),
        fact_type: "kv".to_owned(),
        confidence: 0.6,
        decay_rate: 0.01,
        last_reinforced: chrono::Utc::now(),
        extraction_method: "rules".to_owned(),
        agent_id: None,
        created_at: chrono::Utc::now(),
        superseded_by: None,
        source_quote: String::new(),
      },
      fact::Model {
        id: 2,
        memory_id: 1,
        subject: "Alice".to_owned(),
        predicate: "role".to_owned(),
        object: "Manager".to_owned(),
        fact_type: "kv".to_owned(),
        confidence: 0.9,
        decay_rate: 0.01,
        last_reinforced: chrono::Utc::now(),
        extraction_method: "rules".to_owned(),
        agent_id: None,
        created_at: chrono::Utc::now(),
        superseded_by: None,
        source_quote: String::new(),
      },
    ];

    assert_eq!(find_conflicts(&facts).len(), 1);
  }

  #[tokio::test]
  async fn low_confidence_forces_flag_human() {
    let store = test_store().await;
    let pair = seed_pair(&store).await;
    let winner_id = pair.b.id;
    let loser_id = pair.a.id;

    let provider = Arc::new(StubProvider {
      response: format!(
        "{{\"resolutions\": [{{\"pair_index\": 0, \"action\": \"supersede\", \"winner_id\": {winner_id}, \"loser_id\": {loser_id}, \"reason\": \"newer\", \"confidence\": 0.55, \"merged_fact\": null}}]}}"
      ),
    });

    let summary = resolve_conflicts(&store, provider, vec![pair], &ConflictConfig::default()).await;
    assert_eq!(summary.superseded, 0);
    assert_eq!(summary.flagged, 1);
  }
}
