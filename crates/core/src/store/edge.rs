use cortex_entities::fact_edge::{self, Entity as FactEdgeEntity};
use cortex_shared::{AppError, EdgeSource, EdgeType};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use super::Store;

#[derive(Debug, Clone)]
pub struct NewEdge {
  pub source_fact_id: i64,
  pub target_fact_id: i64,
  pub edge_type: EdgeType,
  pub confidence: f64,
  pub source: EdgeSource,
}

impl Store {
  /// `AddEdge(e)` (spec §4.3): idempotent on `(source, target, type)`. Both
  /// endpoints must reference active facts.
  pub async fn add_edge(&self, e: NewEdge) -> Result<i64, AppError> {
    let source_fact = self.get_fact(e.source_fact_id).await?;
    let target_fact = self.get_fact(e.target_fact_id).await?;

    if source_fact.superseded_by.is_some() || target_fact.superseded_by.is_some() {
      return Err(AppError::invalid_argument("edges must reference active facts"));
    }

    let edge_type = e.edge_type.to_string();

    let existing = FactEdgeEntity::find()
      .filter(fact_edge::Column::SourceFactId.eq(e.source_fact_id))
      .filter(fact_edge::Column::TargetFactId.eq(e.target_fact_id))
      .filter(fact_edge::Column::EdgeType.eq(edge_type.clone()))
      .one(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?;

    if let Some(existing) = existing {
      return Ok(existing.id);
    }

    let active = fact_edge::ActiveModel {
      source_fact_id: Set(e.source_fact_id),
      target_fact_id: Set(e.target_fact_id),
      edge_type: Set(edge_type),
      confidence: Set(e.confidence.clamp(0.0, 1.0)),
      source: Set(e.source.to_string()),
      ..Default::default()
    };

    let inserted = active.insert(&self.db).await.map_err(|err| AppError::storage(err))?;
    Ok(inserted.id)
  }

  pub async fn edges_from(&self, fact_id: i64) -> Result<Vec<fact_edge::Model>, AppError> {
    FactEdgeEntity::find()
      .filter(fact_edge::Column::SourceFactId.eq(fact_id))
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
  }

  /// `CountEdges()`, used by `GET /api/stats` (spec §4.6).
  pub async fn count_edges(&self) -> Result<u64, AppError> {
    FactEdgeEntity::find().count(&self.db).await.map_err(|err| AppError::storage(err))
  }
}

#[cfg(test)]
mod tests {
  use cortex_shared::{ExtractionMethod, FactType};

  use crate::store::fact::NewFact;
  use crate::store::memory::NewMemory;
  use crate::test_support::test_store;

  use super::*;

  async fn seed_fact(store: &crate::store::Store, subject: &str) -> i64 {
    let memory_id = store
      .add_memory(NewMemory {
        content: format!("{subject} content"),
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
        object: "object".to_owned(),
        fact_type: FactType::Kv,
        confidence: 0.9,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "predicate: object".to_owned(),
      })
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn add_edge_is_idempotent() {
    let store = test_store().await;
    let a = seed_fact(&store, "A").await;
    let b = seed_fact(&store, "B").await;

    let edge = NewEdge {
      source_fact_id: a,
      target_fact_id: b,
      edge_type: EdgeType::RelatesTo,
      confidence: 0.8,
      source: EdgeSource::Explicit,
    };

    let first = store.add_edge(edge.clone()).await.unwrap();
    let second = store.add_edge(edge).await.unwrap();
    assert_eq!(first, second);

    let edges = store.edges_from(a).await.unwrap();
    assert_eq!(edges.len(), 1);
  }
}
