use std::collections::HashSet;

use cortex_entities::cluster::{self, Entity as ClusterEntity};
use cortex_entities::fact_cooccurrence::{self, Entity as FactCooccurrenceEntity};
use cortex_entities::fact::{self, Entity as FactEntity};
use cortex_shared::AppError;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
  TransactionTrait,
};

use super::Store;

/// A cluster ready to persist (spec §3 `Cluster`); rebuilt in full by the
/// clusterer, never partially mutated.
#[derive(Debug, Clone)]
pub struct NewCluster {
  pub name: String,
  pub aliases: Vec<String>,
  pub top_subjects: Vec<String>,
  pub subjects: Vec<String>,
  pub fact_ids: Vec<i64>,
  pub fact_count: i64,
  pub avg_confidence: f64,
  pub cohesion: f64,
  pub color: String,
}

#[derive(Debug, Clone)]
pub struct ClusterDetail {
  pub cluster: cluster::Model,
  pub facts: Vec<fact::Model>,
}

impl Store {
  /// `ListClusters()` (spec §4.3), sorted by fact_count desc, cohesion desc,
  /// name asc (spec §4.5).
  pub async fn list_clusters(&self) -> Result<Vec<cluster::Model>, AppError> {
    ClusterEntity::find()
      .order_by_desc(cluster::Column::FactCount)
      .order_by_desc(cluster::Column::Cohesion)
      .order_by_asc(cluster::Column::Name)
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
  }

  /// `GetClusterDetail(id, limit)` (spec §4.3): the cluster plus up to
  /// `limit` of its active facts by id.
  pub async fn get_cluster_detail(&self, id: i64, limit: u64) -> Result<ClusterDetail, AppError> {
    let cluster = ClusterEntity::find_by_id(id)
      .one(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?
      .ok_or_else(|| AppError::not_found(format!("cluster {id} not found")))?;

    let fact_ids: Vec<i64> = serde_json::from_value(cluster.fact_ids.clone()).unwrap_or_default();

    let facts = FactEntity::find()
      .filter(fact::Column::Id.is_in(fact_ids))
      .filter(fact::Column::SupersededBy.is_null())
      .order_by_asc(fact::Column::Id)
      .limit(limit)
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?;

    Ok(ClusterDetail { cluster, facts })
  }

  /// Rebuilds the full cluster set atomically: deletes every existing cluster
  /// row, then inserts the clusterer's fresh output (spec §3 Cluster
  /// lifecycle: "rebuilt in full ... never partially mutated").
  pub async fn replace_clusters(&self, clusters: Vec<NewCluster>) -> Result<(), AppError> {
    let txn = self.db.begin().await.map_err(|err| AppError::storage(err))?;

    ClusterEntity::delete_many()
      .exec(&txn)
      .await
      .map_err(|err| AppError::storage(err))?;

    for c in clusters {
      let active = cluster::ActiveModel {
        name: Set(c.name),
        aliases: Set(serde_json::to_value(c.aliases).unwrap_or(serde_json::Value::Null)),
        top_subjects: Set(serde_json::to_value(c.top_subjects).unwrap_or(serde_json::Value::Null)),
        subjects: Set(serde_json::to_value(c.subjects).unwrap_or(serde_json::Value::Null)),
        fact_ids: Set(serde_json::to_value(c.fact_ids).unwrap_or(serde_json::Value::Null)),
        fact_count: Set(c.fact_count),
        avg_confidence: Set(c.avg_confidence),
        cohesion: Set(c.cohesion.clamp(0.0, 1.0)),
        color: Set(c.color),
        ..Default::default()
      };
      active.insert(&txn).await.map_err(|err| AppError::storage(err))?;
    }

    txn.commit().await.map_err(|err| AppError::storage(err))?;
    Ok(())
  }

  /// Fact ids referenced by any persisted cluster; used by
  /// `CountUnclusteredFacts`.
  pub(super) async fn clustered_fact_ids(&self) -> Result<HashSet<i64>, AppError> {
    let clusters = ClusterEntity::find()
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?;

    let mut ids = HashSet::new();
    for c in clusters {
      let fact_ids: Vec<i64> = serde_json::from_value(c.fact_ids).unwrap_or_default();
      ids.extend(fact_ids);
    }
    Ok(ids)
  }

  /// `GetCooccurrencesForFact(id, limit)` (spec §4.3).
  pub async fn get_cooccurrences_for_fact(
    &self,
    fact_id: i64,
    limit: u64,
  ) -> Result<Vec<fact_cooccurrence::Model>, AppError> {
    FactCooccurrenceEntity::find()
      .filter(
        Condition::any()
          .add(fact_cooccurrence::Column::FactIdA.eq(fact_id))
          .add(fact_cooccurrence::Column::FactIdB.eq(fact_id)),
      )
      .order_by_desc(fact_cooccurrence::Column::Count)
      .limit(limit)
      .all(&self.db)
      .await
      .map_err(|err| AppError::storage(err))
  }

  /// Records that two facts co-occurred in a memory, incrementing the
  /// natural-key row idempotently; `fact_id_a < fact_id_b` per spec §3.
  pub async fn record_cooccurrence(&self, fact_a: i64, fact_b: i64) -> Result<(), AppError> {
    let (a, b) = if fact_a < fact_b { (fact_a, fact_b) } else { (fact_b, fact_a) };
    if a == b {
      return Ok(());
    }

    let existing = FactCooccurrenceEntity::find()
      .filter(fact_cooccurrence::Column::FactIdA.eq(a))
      .filter(fact_cooccurrence::Column::FactIdB.eq(b))
      .one(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?;

    match existing {
      Some(existing) => {
        let count = existing.count + 1;
        let mut active: fact_cooccurrence::ActiveModel = existing.into();
        active.count = Set(count);
        active.update(&self.db).await.map_err(|err| AppError::storage(err))?;
      }
      None => {
        let active = fact_cooccurrence::ActiveModel {
          fact_id_a: Set(a),
          fact_id_b: Set(b),
          count: Set(1),
        };
        active.insert(&self.db).await.map_err(|err| AppError::storage(err))?;
      }
    }

    Ok(())
  }
}
