use std::collections::{HashSet, VecDeque};

use cortex_entities::{fact, fact_edge};
use cortex_shared::AppError;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::Store;

#[derive(Debug, Clone)]
pub struct TraversalNode {
  pub fact: fact::Model,
  pub depth: u32,
  pub edges: Vec<fact_edge::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct TraversalResult {
  pub nodes: Vec<TraversalNode>,
}

impl Store {
  /// `TraverseGraph(rootFactID, depth, minConfidence)` (spec §4.3): BFS up to
  /// `depth`, filtering edges by `confidence >= minConfidence`. Visited set is
  /// bounded so edge cycles cannot loop forever (spec §9).
  pub async fn traverse_graph(
    &self,
    root_fact_id: i64,
    depth: u32,
    min_confidence: f64,
  ) -> Result<TraversalResult, AppError> {
    let root = self.get_fact(root_fact_id).await?;

    let mut visited = HashSet::new();
    visited.insert(root.id);

    let mut queue = VecDeque::new();
    queue.push_back((root, 0u32));

    let mut nodes = Vec::new();

    while let Some((current, current_depth)) = queue.pop_front() {
      let all_edges = self.edges_from(current.id).await?;
      let edges: Vec<fact_edge::Model> = all_edges
        .into_iter()
        .filter(|e| e.confidence >= min_confidence)
        .collect();

      if current_depth < depth {
        for edge in &edges {
          if visited.insert(edge.target_fact_id) {
            if let Ok(target) = self.get_fact(edge.target_fact_id).await {
              if target.superseded_by.is_none() {
                queue.push_back((target, current_depth + 1));
              }
            }
          }
        }
      }

      nodes.push(TraversalNode {
        fact: current,
        depth: current_depth,
        edges,
      });
    }

    Ok(TraversalResult { nodes })
  }

  /// Facts belonging to any of the given memory ids, including superseded
  /// ones; used by the timeline/impact query layers that need full history.
  pub async fn get_facts_by_memory_ids_including_superseded(
    &self,
    memory_ids: &[i64],
  ) -> Result<Vec<fact::Model>, AppError> {
    cortex_entities::FactEntity::find()
      .filter(fact::Column::MemoryId.is_in(memory_ids.to_vec()))
      .all(self.connection())
      .await
      .map_err(|err| AppError::storage(err))
  }
}
