use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A directed semantic edge between two facts (spec §3 `FactEdge`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "fact_edges")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub source_fact_id: i64,
  pub target_fact_id: i64,
  pub edge_type: String,
  pub confidence: f64,
  /// "explicit" | "inferred" | "cooccurrence"
  pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
