use std::collections::{HashMap, HashSet};

use cortex_entities::fact;
use cortex_shared::AppError;

use crate::store::Store;

/// Semantic bucket a predicate falls into (spec §4.6 `/api/impact`). Rules are
/// applied in order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateGroup {
  HasStrategy,
  HasConfig,
  HasTool,
  HasLocation,
  DependsOn,
  RelatedTo,
  Other,
}

impl PredicateGroup {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::HasStrategy => "has_strategy",
      Self::HasConfig => "has_config",
      Self::HasTool => "has_tool",
      Self::HasLocation => "has_location",
      Self::DependsOn => "depends_on",
      Self::RelatedTo => "related_to",
      Self::Other => "other",
    }
  }

  fn classify(predicate: &str) -> Self {
    let lower = predicate.to_lowercase();
    if lower.contains("strategy") {
      Self::HasStrategy
    } else if lower.contains("config") || lower.contains("setting") {
      Self::HasConfig
    } else if lower.contains("uses") || lower.contains("tool") || lower.contains("sdk") || lower.contains("api") {
      Self::HasTool
    } else if lower.contains("located at") || lower.contains("located in") || lower.contains("location") {
      Self::HasLocation
    } else if lower.contains("depends on") || lower.contains("requires") || lower.contains("blocks") {
      Self::DependsOn
    } else if lower.contains("works with") || lower.contains("related") || lower.contains("connected") {
      Self::RelatedTo
    } else {
      Self::Other
    }
  }
}

/// One fact in an impact response, ranked for relevance to the traversal root
/// (spec §4.6).
#[derive(Debug, Clone)]
pub struct ImpactNode {
  pub fact: fact::Model,
  pub depth: u32,
  pub group: PredicateGroup,
  pub connected_count: usize,
  pub relevance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ImpactResult {
  pub nodes: Vec<ImpactNode>,
  pub total: usize,
}

impl Store {
  /// `GET /api/impact?subject=S&depth=D&limit=L&offset=O&min_confidence=C`
  /// (spec §4.6): from every active root fact with `subject = S`, traverse to
  /// `depth`, rank by relevance, and page the result.
  pub async fn impact(
    &self,
    subject: &str,
    depth: u32,
    min_confidence: f64,
    limit: u64,
    offset: u64,
  ) -> Result<ImpactResult, AppError> {
    let roots = self.get_facts_by_subject(subject).await?;

    let mut best_depth: HashMap<i64, u32> = HashMap::new();
    let mut facts: HashMap<i64, fact::Model> = HashMap::new();
    let mut neighbors: HashMap<i64, HashSet<i64>> = HashMap::new();

    for root in &roots {
      let traversal = self.traverse_graph(root.id, depth, min_confidence).await?;
      for node in traversal.nodes {
        let entry = best_depth.entry(node.fact.id).or_insert(node.depth);
        if node.depth < *entry {
          *entry = node.depth;
        }
        let distinct: HashSet<i64> = node.edges.iter().map(|edge| edge.target_fact_id).collect();
        neighbors
          .entry(node.fact.id)
          .and_modify(|existing| existing.extend(distinct.iter().copied()))
          .or_insert(distinct);
        facts.entry(node.fact.id).or_insert(node.fact);
      }
    }

    let neighbor_counts: HashMap<i64, usize> = neighbors.into_iter().map(|(id, set)| (id, set.len())).collect();

    let max_connected = neighbor_counts.values().copied().max().unwrap_or(0).max(1) as f64;

    let mut nodes: Vec<ImpactNode> = facts
      .into_values()
      .filter(|f| f.confidence >= min_confidence)
      .map(|f| {
        let depth = best_depth.get(&f.id).copied().unwrap_or(0);
        let connected_count = neighbor_counts.get(&f.id).copied().unwrap_or(0);
        let relevance = (0.78 * f.confidence + 0.28 * (connected_count as f64 / max_connected) - 0.06 * f64::from(depth))
          .clamp(0.0, 1.0);
        let group = PredicateGroup::classify(&f.predicate);
        ImpactNode {
          fact: f,
          depth,
          group,
          connected_count,
          relevance,
        }
      })
      .collect();

    nodes.sort_by(|a, b| {
      b.relevance
        .partial_cmp(&a.relevance)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| b.fact.confidence.partial_cmp(&a.fact.confidence).unwrap_or(std::cmp::Ordering::Equal))
        .then_with(|| b.connected_count.cmp(&a.connected_count))
        .then_with(|| a.fact.id.cmp(&b.fact.id))
    });

    let total = nodes.len();
    let page = nodes.into_iter().skip(offset as usize).take(limit as usize).collect();

    Ok(ImpactResult { nodes: page, total })
  }
}

#[cfg(test)]
mod tests {
  use cortex_shared::{EdgeSource, EdgeType, ExtractionMethod, FactType};

  use crate::store::{NewEdge, NewFact, NewMemory};
  use crate::test_support::test_store;

  use super::*;

  async fn seed_fact(store: &Store, subject: &str, predicate: &str, confidence: f64) -> i64 {
    let memory_id = store
      .add_memory(NewMemory {
        content: format!("{subject} {predicate}"),
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
        predicate: predicate.to_owned(),
        object: "object".to_owned(),
        fact_type: FactType::Kv,
        confidence,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "quote".to_owned(),
      })
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn classifies_predicate_into_semantic_group() {
    assert_eq!(PredicateGroup::classify("trading_strategy").as_str(), "has_strategy");
    assert_eq!(PredicateGroup::classify("uses_tool").as_str(), "has_tool");
    assert_eq!(PredicateGroup::classify("likes").as_str(), "other");
  }

  #[tokio::test]
  async fn ranks_and_pages_impact_nodes() {
    let store = test_store().await;
    let root = seed_fact(&store, "Alice", "role", 0.9).await;
    let neighbor = seed_fact(&store, "Bob", "works_with", 0.7).await;

    store
      .add_edge(NewEdge {
        source_fact_id: root,
        target_fact_id: neighbor,
        edge_type: EdgeType::RelatesTo,
        confidence: 0.8,
        source: EdgeSource::Explicit,
      })
      .await
      .unwrap();

    let result = store.impact("Alice", 2, 0.0, 10, 0).await.unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.nodes[0].fact.id, root);
  }

  #[tokio::test]
  async fn filters_by_min_confidence() {
    let store = test_store().await;
    seed_fact(&store, "Alice", "role", 0.2).await;

    let result = store.impact("Alice", 1, 0.5, 10, 0).await.unwrap();
    assert_eq!(result.total, 0);
  }
}
