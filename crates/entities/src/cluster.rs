use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A topic community grouping subjects (spec §3 `Cluster`). `aliases`, `top_subjects`,
/// `subjects`, and `fact_ids` are stored as JSON arrays; rebuilt in full, never
/// partially mutated, mirroring how the teacher stores `episodic_memory.messages` as a
/// JSON column and parses it through a domain wrapper (see
/// `cortex_core::store::{NewCluster, ClusterDetail}`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "clusters")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub name: String,
  #[sea_orm(column_type = "Json")]
  pub aliases: serde_json::Value,
  #[sea_orm(column_type = "Json")]
  pub top_subjects: serde_json::Value,
  #[sea_orm(column_type = "Json")]
  pub subjects: serde_json::Value,
  #[sea_orm(column_type = "Json")]
  pub fact_ids: serde_json::Value,
  pub fact_count: i64,
  pub avg_confidence: f64,
  pub cohesion: f64,
  pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
