use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A subject/predicate/object triple with typing, confidence, decay, and provenance
/// (spec §3 `Fact`). Active iff `superseded_by` is null.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "facts")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub memory_id: i64,
  pub subject: String,
  pub predicate: String,
  pub object: String,
  /// One of spec §3's nine fact types, stored as its lowercase name.
  pub fact_type: String,
  pub confidence: f64,
  pub decay_rate: f64,
  pub last_reinforced: DateTimeUtc,
  /// "rules" | "llm" | "llm-enrich"
  pub extraction_method: String,
  pub agent_id: Option<String>,
  pub created_at: DateTimeUtc,
  /// Id of the newer fact that replaces this one; null/active otherwise (spec's Open
  /// Question on zero-vs-null is standardized to null in new storage — see DESIGN.md).
  pub superseded_by: Option<i64>,
  #[sea_orm(column_type = "Text")]
  pub source_quote: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::memory::Entity",
    from = "Column::MemoryId",
    to = "super::memory::Column::Id"
  )]
  Memory,
}

impl Related<super::memory::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Memory.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
