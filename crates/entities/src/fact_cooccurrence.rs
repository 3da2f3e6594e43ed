use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A symmetric count of how often two facts appear in the same memory (spec §3
/// `FactCooccurrence`). Invariant: `fact_id_a < fact_id_b`, enforced by callers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "fact_cooccurrences")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub fact_id_a: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub fact_id_b: i64,
  pub count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
