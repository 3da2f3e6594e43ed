use sea_orm_migration::{
  prelude::*,
  schema::{big_integer, double, pk_bigint, string, string_null, text, timestamp_with_time_zone},
};

use crate::m20260701_01_create_memories_table::Memories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Facts::Table)
          .if_not_exists()
          .col(pk_bigint(Facts::Id))
          .col(big_integer(Facts::MemoryId))
          .col(string(Facts::Subject))
          .col(string(Facts::Predicate))
          .col(text(Facts::Object))
          .col(string(Facts::FactType))
          .col(double(Facts::Confidence))
          .col(double(Facts::DecayRate))
          .col(timestamp_with_time_zone(Facts::LastReinforced))
          .col(string(Facts::ExtractionMethod))
          .col(string_null(Facts::AgentId))
          .col(timestamp_with_time_zone(Facts::CreatedAt))
          .col(big_integer(Facts::SupersededBy).null())
          .col(text(Facts::SourceQuote))
          .foreign_key(
            ForeignKey::create()
              .name("fk_facts_memory_id")
              .from(Facts::Table, Facts::MemoryId)
              .to(Memories::Table, Memories::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_facts_memory_id")
          .table(Facts::Table)
          .col(Facts::MemoryId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_facts_subject")
          .table(Facts::Table)
          .col(Facts::Subject)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_facts_superseded_by")
          .table(Facts::Table)
          .col(Facts::SupersededBy)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Facts::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Facts {
  Table,
  Id,
  MemoryId,
  Subject,
  Predicate,
  Object,
  FactType,
  Confidence,
  DecayRate,
  LastReinforced,
  ExtractionMethod,
  AgentId,
  CreatedAt,
  SupersededBy,
  SourceQuote,
}
