use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An atomic ingested text chunk (spec §3 `Memory`). Never mutated in place once
/// written; `content` is UTF-8 and trimmed at ingestion time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "memories")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(column_type = "Text")]
  pub content: String,
  pub source_file: String,
  pub source_line: Option<i32>,
  pub source_section: Option<String>,
  pub imported_at: DateTimeUtc,
  pub project: Option<String>,
  pub memory_class: Option<String>,
  pub external_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::fact::Entity")]
  Fact,
}

impl Related<super::fact::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Fact.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
