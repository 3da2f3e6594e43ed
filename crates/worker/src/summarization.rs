use cortex_ai::{CompleteOptions, Provider};
use cortex_core::Store;
use cortex_shared::{AppError, ExtractionMethod, FactType};
use serde::Deserialize;

/// `SummarizeClusters` tuning (spec §4.4.4).
#[derive(Debug, Clone)]
pub struct SummarizationConfig {
  pub min_cluster_size: u64,
  pub max_facts_sent: u64,
}

impl Default for SummarizationConfig {
  fn default() -> Self {
    Self {
      min_cluster_size: 5,
      max_facts_sent: 100,
    }
  }
}

#[derive(Debug, Default)]
pub struct SummarizationSummary {
  pub clusters_processed: usize,
  pub summary_facts_created: usize,
  pub facts_superseded: usize,
  /// `original / max(new, 1)` per processed cluster (spec §4.4.4).
  pub compression_ratios: Vec<f64>,
}

const SYSTEM_PROMPT: &str = "You summarize a cluster of related facts into fewer, higher-level \
facts. Each summary fact must list which input fact ids it replaces. Facts that stand on their \
own can be listed as kept_as_is instead. Respond as JSON: {\"summaries\": [{\"subject\": \"\", \
\"predicate\": \"\", \"object\": \"\", \"fact_type\": \"kv\", \"confidence\": 0.0, \
\"replaces\": [0]}], \"kept_as_is\": [0]}";

#[derive(Debug, Deserialize)]
struct SummarizationResponse {
  summaries: Vec<SummaryFact>,
  #[allow(dead_code)]
  kept_as_is: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct SummaryFact {
  subject: String,
  predicate: String,
  object: String,
  fact_type: String,
  confidence: f64,
  replaces: Vec<i64>,
}

/// Summarizes every cluster with at least `config.min_cluster_size` active
/// facts, inserting summary facts and superseding whichever input facts they
/// replace (spec §4.4.4).
pub async fn summarize_clusters(
  store: &Store,
  provider: &dyn Provider,
  config: &SummarizationConfig,
) -> Result<SummarizationSummary, AppError> {
  let mut summary = SummarizationSummary::default();

  for cluster in store.list_clusters().await? {
    if (cluster.fact_count as u64) < config.min_cluster_size {
      continue;
    }

    let detail = store.get_cluster_detail(cluster.id, config.max_facts_sent).await?;
    if detail.facts.is_empty() {
      continue;
    }

    let facts_block = detail
      .facts
      .iter()
      .map(|f| format!("- id={} subject=\"{}\" predicate=\"{}\" object=\"{}\"", f.id, f.subject, f.predicate, f.object))
      .collect::<Vec<_>>()
      .join("\n");

    let prompt = format!("Cluster \"{}\":\n{facts_block}", cluster.name);

    let raw = match provider.complete(&prompt, &CompleteOptions::json().with_system(SYSTEM_PROMPT)).await {
      Ok(raw) => raw,
      Err(_) => continue,
    };

    let parsed: Result<SummarizationResponse, _> = cortex_ai::parse_llm_json(&raw);
    let Ok(parsed) = parsed else { continue };

    let original_count = detail.facts.len();
    let mut new_count = 0;

    for candidate in &parsed.summaries {
      if candidate.predicate.trim().is_empty() || candidate.object.trim().is_empty() {
        continue;
      }
      if candidate.replaces.is_empty() {
        continue;
      }

      let fact_type = candidate.fact_type.parse::<FactType>().unwrap_or(FactType::Kv);
      let subject: String = candidate.subject.chars().take(50).collect();

      let Some(first_replaced) = detail.facts.iter().find(|f| f.id == candidate.replaces[0]) else {
        continue;
      };

      let merged = cortex_core::store::NewFact {
        memory_id: first_replaced.memory_id,
        subject,
        predicate: candidate.predicate.clone(),
        object: candidate.object.clone(),
        fact_type,
        confidence: candidate.confidence.clamp(0.0, 1.0),
        decay_rate: None,
        extraction_method: ExtractionMethod::LlmEnrich,
        agent_id: None,
        source_quote: format!("summary of cluster \"{}\"", cluster.name),
      };

      if store.merge_facts(&candidate.replaces, merged).await.is_ok() {
        new_count += 1;
        summary.summary_facts_created += 1;
        summary.facts_superseded += candidate.replaces.len();
      }
    }

    summary.clusters_processed += 1;
    summary
      .compression_ratios
      .push(original_count as f64 / (new_count.max(1)) as f64);
  }

  Ok(summary)
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use cortex_core::store::{NewFact, NewMemory};
  use cortex_core::rebuild_clusters;
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
  async fn summarizes_cluster_and_supersedes_inputs() {
    let store = test_store().await;

    let mut ids = Vec::new();
    for subject in ["Alice", "Alice", "Alice", "Alice", "Alice"] {
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

      let id = store
        .add_fact(NewFact {
          memory_id,
          subject: subject.to_owned(),
          predicate: "likes".to_owned(),
          object: format!("thing-{}", ids.len()),
          fact_type: FactType::Kv,
          confidence: 0.9,
          decay_rate: None,
          extraction_method: cortex_shared::ExtractionMethod::Rules,
          agent_id: None,
          source_quote: "quote".to_owned(),
        })
        .await
        .unwrap();
      ids.push(id);
    }

    rebuild_clusters(&store).await.unwrap();
    let clusters = store.list_clusters().await.unwrap();
    assert_eq!(clusters.len(), 1);

    let replaces = format!("{:?}", ids);
    let provider = StubProvider {
      response: format!(
        "{{\"summaries\": [{{\"subject\": \"Alice\", \"predicate\": \"likes\", \"object\": \"several things\", \"fact_type\": \"kv\", \"confidence\": 0.8, \"replaces\": {replaces}}}], \"kept_as_is\": []}}"
      ),
    };

    let summary = summarize_clusters(&store, &provider, &SummarizationConfig::default()).await.unwrap();
    assert_eq!(summary.clusters_processed, 1);
    assert_eq!(summary.summary_facts_created, 1);
    assert_eq!(summary.facts_superseded, 5);
  }
}
