use chrono::Utc;
use cortex_entities::fact::{self, Entity as FactEntity};
use cortex_shared::{AppError, ExtractionMethod, FactType};
use sea_orm::{
  ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
  TransactionTrait,
};

use super::Store;

/// Fields accepted by `AddFact` (spec §4.3). `decay_rate` defaults from
/// `fact_type` when not supplied.
#[derive(Debug, Clone)]
pub struct NewFact {
  pub memory_id: i64,
  pub subject: String,
  pub predicate: String,
  pub object: String,
  pub fact_type: FactType,
  pub confidence: f64,
  pub decay_rate: Option<f64>,
  pub extraction_method: ExtractionMethod,
  pub agent_id: Option<String>,
  pub source_quote: String,
}

impl Store {
  /// `AddFact(f) -> id` (spec §4.3). Enforces referential integrity to
  /// `Memory`; stamps `created_at`/`last_reinforced`.
  pub async fn add_fact(&self, f: NewFact) -> Result<i64, AppError> {
    self.get_memory(f.memory_id).await?;

    let now = Utc::now();
    let decay_rate = f.decay_rate.unwrap_or_else(|| f.fact_type.default_decay_rate());

    let active = fact::ActiveModel {
      memory_id: Set(f.memory_id),
      subject: Set(f.subject),
      predicate: Set(f.predicate),
      object: Set(f.object),
      fact_type: Set(f.fact_type.to_string()),
      confidence: Set(f.confidence.clamp(0.0, 1.0)),
      decay_rate: Set(decay_rate),
      last_reinforced: Set(now),
      extraction_method: Set(f.extraction_method.to_string()),
      agent_id: Set(f.agent_id),
      created_at: Set(now),
      superseded_by: Set(None),
      source_quote: Set(f.source_quote),
      ..Default::default()
    };

    let inserted = active.insert(&self.db).await.map_err(|err| AppError::storage(err))?;
    Ok(inserted.id)
  }

  /// `GetFactsByMemoryIDs([id])` (spec §4.3). Returns only active facts.
  pub async fn get_facts_by_memory_ids(&self, memory_ids: &[i64]) -> Result<Vec<fact::Model>, AppError> {
    FactEntity::find()
      .filter(fact::Column::MemoryId.is_in(memory_ids.to_vec()))
      .filter(fact::Column::SupersededBy.is_null())
      .order_by_asc(fact::Column::Id)
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
  }

  /// Fetch a single active-or-not fact by id; used internally by edge/graph
  /// operations that need to inspect superseded facts too.
  pub async fn get_fact(&self, id: i64) -> Result<fact::Model, AppError> {
    FactEntity::find_by_id(id)
      .one(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?
      .ok_or_else(|| AppError::not_found(format!("fact {id} not found")))
  }

  /// `SupersedeFact(oldID, newID)` (spec §4.3). Atomically sets
  /// `superseded_by`; invariant (iv): the new fact's `created_at` must be ≥
  /// the old fact's.
  pub async fn supersede_fact(&self, old_id: i64, new_id: i64) -> Result<(), AppError> {
    let old = self.get_fact(old_id).await?;
    let new = self.get_fact(new_id).await?;

    if new.created_at < old.created_at {
      return Err(AppError::invalid_argument(format!(
        "superseding fact {new_id} is older than superseded fact {old_id}"
      )));
    }

    let mut active: fact::ActiveModel = old.into();
    active.superseded_by = Set(Some(new_id));
    active.update(&self.db).await.map_err(|err| AppError::storage(err))?;
    Ok(())
  }

  /// Updates an active fact's `fact_type` in place. Backs `ClassifyFacts`
  /// (spec §4.4.2): classification corrects a fact's type without touching its
  /// subject/predicate/object or provenance.
  pub async fn reclassify_fact(&self, id: i64, fact_type: FactType) -> Result<(), AppError> {
    let existing = self.get_fact(id).await?;
    let mut active: fact::ActiveModel = existing.into();
    active.fact_type = Set(fact_type.to_string());
    active.update(&self.db).await.map_err(|err| AppError::storage(err))?;
    Ok(())
  }

  /// `MergeFacts([ids]) -> newFact` (spec §4.3). Creates one new fact and
  /// supersedes every input in a single transaction.
  pub async fn merge_facts(&self, ids: &[i64], merged: NewFact) -> Result<i64, AppError> {
    if ids.is_empty() {
      return Err(AppError::invalid_argument("merge_facts requires at least one input id"));
    }

    let txn = self.db.begin().await.map_err(|err| AppError::storage(err))?;

    let now = Utc::now();
    let decay_rate = merged.decay_rate.unwrap_or_else(|| merged.fact_type.default_decay_rate());

    let active = fact::ActiveModel {
      memory_id: Set(merged.memory_id),
      subject: Set(merged.subject),
      predicate: Set(merged.predicate),
      object: Set(merged.object),
      fact_type: Set(merged.fact_type.to_string()),
      confidence: Set(merged.confidence.clamp(0.0, 1.0)),
      decay_rate: Set(decay_rate),
      last_reinforced: Set(now),
      extraction_method: Set(merged.extraction_method.to_string()),
      agent_id: Set(merged.agent_id),
      created_at: Set(now),
      superseded_by: Set(None),
      source_quote: Set(merged.source_quote),
      ..Default::default()
    };

    let inserted = active.insert(&txn).await.map_err(|err| AppError::storage(err))?;

    for &id in ids {
      let existing = FactEntity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(|err| AppError::storage(err))?
        .ok_or_else(|| AppError::not_found(format!("fact {id} not found")))?;

      let mut active: fact::ActiveModel = existing.into();
      active.superseded_by = Set(Some(inserted.id));
      active.update(&txn).await.map_err(|err| AppError::storage(err))?;
    }

    txn.commit().await.map_err(|err| AppError::storage(err))?;
    Ok(inserted.id)
  }

  /// Active facts by subject, case-insensitive exact match (used by `GET
  /// /api/facts?subject=S` and the graph API, spec §4.6).
  pub async fn get_facts_by_subject(&self, subject: &str) -> Result<Vec<fact::Model>, AppError> {
    let lower = subject.to_lowercase();
    FactEntity::find()
      .filter(fact::Column::SupersededBy.is_null())
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
      .map(|facts| {
        facts
          .into_iter()
          .filter(|f| f.subject.to_lowercase() == lower)
          .collect()
      })
  }

  /// All facts for a subject, case-insensitive exact match, active and
  /// superseded alike; used by the timeline query (spec §4.6 `/api/timeline`)
  /// which needs the full history to detect supersession/decay.
  pub async fn get_facts_by_subject_all(&self, subject: &str) -> Result<Vec<fact::Model>, AppError> {
    let lower = subject.to_lowercase();
    FactEntity::find()
      .order_by_asc(fact::Column::CreatedAt)
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
      .map(|facts| {
        facts
          .into_iter()
          .filter(|f| f.subject.to_lowercase() == lower)
          .collect()
      })
  }

  /// All active facts, used by the clusterer to rebuild subject communities
  /// (spec §4.5).
  pub async fn all_active_facts(&self) -> Result<Vec<fact::Model>, AppError> {
    FactEntity::find()
      .filter(fact::Column::SupersededBy.is_null())
      .order_by_asc(fact::Column::Id)
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
  }

  /// `CountActiveFacts()` (spec §4.3).
  pub async fn count_active_facts(&self) -> Result<u64, AppError> {
    FactEntity::find()
      .filter(fact::Column::SupersededBy.is_null())
      .count(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
  }

  /// `CountUnclusteredFacts()` (spec §4.3): active facts not referenced by any
  /// persisted cluster's `fact_ids`.
  pub async fn count_unclustered_facts(&self) -> Result<u64, AppError> {
    let clustered_ids = self.clustered_fact_ids().await?;
    let active = FactEntity::find()
      .filter(fact::Column::SupersededBy.is_null())
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?;

    Ok(
      active
        .into_iter()
        .filter(|f| !clustered_ids.contains(&f.id))
        .count() as u64,
    )
  }
}
