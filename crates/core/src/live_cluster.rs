use std::collections::BTreeMap;

use cortex_entities::{fact, fact_cooccurrence};
use cortex_shared::AppError;

use crate::clusterer::normalize;
use crate::store::Store;

const MIN_SUBJECT_FACTS: usize = 3;
const MAX_SUBJECT_FACTS: usize = 200;
const FACTS_PER_SUBJECT: usize = 6;

/// One sampled subject and its top facts (spec §4.6 `/api/cluster`).
#[derive(Debug, Clone)]
pub struct LiveClusterNode {
  pub subject: String,
  pub facts: Vec<fact::Model>,
}

/// A synthetic edge linking two facts that share a sampled subject.
#[derive(Debug, Clone)]
pub struct SyntheticEdge {
  pub from_fact_id: i64,
  pub to_fact_id: i64,
  pub subject: String,
}

#[derive(Debug, Clone, Default)]
pub struct LiveClusterView {
  pub nodes: Vec<LiveClusterNode>,
  pub edges: Vec<SyntheticEdge>,
  pub cooccurrences: Vec<fact_cooccurrence::Model>,
}

impl Store {
  /// `GET /api/cluster?limit=L[&q=T]` (spec §4.6): samples up to `limit`
  /// subjects with between 3 and 200 active facts, takes the top 6 per
  /// subject by confidence, and returns subject-based synthetic edges plus
  /// cooccurrences for the sampled facts.
  pub async fn live_cluster_sample(&self, limit: u64, query: Option<&str>) -> Result<LiveClusterView, AppError> {
    let facts = self.all_active_facts().await?;

    let mut by_subject: BTreeMap<String, (String, Vec<fact::Model>)> = BTreeMap::new();
    for fact in facts {
      let key = normalize(&fact.subject);
      if key.is_empty() {
        continue;
      }
      let entry = by_subject.entry(key).or_insert_with(|| (fact.subject.clone(), Vec::new()));
      entry.1.push(fact);
    }

    let needle = query.map(str::to_lowercase);

    let mut groups: Vec<(String, Vec<fact::Model>)> = by_subject
      .into_values()
      .filter(|(_, facts)| facts.len() >= MIN_SUBJECT_FACTS && facts.len() <= MAX_SUBJECT_FACTS)
      .filter(|(display, _)| needle.as_ref().is_none_or(|n| display.to_lowercase().contains(n)))
      .collect();

    groups.truncate(limit as usize);

    let mut nodes = Vec::with_capacity(groups.len());
    let mut edges = Vec::new();
    let mut cooccurrences = Vec::new();

    for (subject, mut facts) in groups {
      facts.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
      facts.truncate(FACTS_PER_SUBJECT);

      for pair in facts.windows(2) {
        edges.push(SyntheticEdge {
          from_fact_id: pair[0].id,
          to_fact_id: pair[1].id,
          subject: subject.clone(),
        });
      }

      for fact in &facts {
        cooccurrences.extend(self.get_cooccurrences_for_fact(fact.id, 10).await?);
      }

      nodes.push(LiveClusterNode { subject, facts });
    }

    cooccurrences.sort_by_key(|c| (c.fact_id_a, c.fact_id_b));
    cooccurrences.dedup_by_key(|c| (c.fact_id_a, c.fact_id_b));

    Ok(LiveClusterView { nodes, edges, cooccurrences })
  }
}

#[cfg(test)]
mod tests {
  use cortex_shared::{ExtractionMethod, FactType};

  use crate::store::{NewFact, NewMemory};
  use crate::test_support::test_store;

  use super::*;

  async fn seed(store: &Store, subject: &str, count: usize) {
    for i in 0..count {
      let memory_id = store
        .add_memory(NewMemory {
          content: format!("{subject} fact {i}"),
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
          subject: subject.to_owned(),
          predicate: "predicate".to_owned(),
          object: format!("object-{i}"),
          fact_type: FactType::Kv,
          confidence: 0.5 + (i as f64 * 0.01),
          decay_rate: None,
          extraction_method: ExtractionMethod::Rules,
          agent_id: None,
          source_quote: "quote".to_owned(),
        })
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn skips_subjects_below_minimum_fact_count() {
    let store = test_store().await;
    seed(&store, "Alice", 2).await;

    let view = store.live_cluster_sample(10, None).await.unwrap();
    assert!(view.nodes.is_empty());
  }

  #[tokio::test]
  async fn samples_qualifying_subject_and_links_top_facts() {
    let store = test_store().await;
    seed(&store, "Alice", 4).await;

    let view = store.live_cluster_sample(10, None).await.unwrap();
    assert_eq!(view.nodes.len(), 1);
    assert_eq!(view.nodes[0].facts.len(), 4);
    assert_eq!(view.edges.len(), 3);
  }

  #[tokio::test]
  async fn filters_by_query() {
    let store = test_store().await;
    seed(&store, "Alice", 3).await;
    seed(&store, "Bob", 3).await;

    let view = store.live_cluster_sample(10, Some("ali")).await.unwrap();
    assert_eq!(view.nodes.len(), 1);
    assert_eq!(view.nodes[0].subject, "Alice");
  }
}
