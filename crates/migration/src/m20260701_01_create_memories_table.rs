use sea_orm_migration::{
  prelude::*,
  schema::{integer, pk_bigint, string, string_null, text, timestamp_with_time_zone},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Memories::Table)
          .if_not_exists()
          .col(pk_bigint(Memories::Id))
          .col(text(Memories::Content))
          .col(string(Memories::SourceFile))
          .col(integer(Memories::SourceLine).null())
          .col(string_null(Memories::SourceSection))
          .col(timestamp_with_time_zone(Memories::ImportedAt))
          .col(string_null(Memories::Project))
          .col(string_null(Memories::MemoryClass))
          .col(string_null(Memories::ExternalId))
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_memories_external_id")
          .table(Memories::Table)
          .col(Memories::ExternalId)
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Memories::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Memories {
  Table,
  Id,
  Content,
  SourceFile,
  SourceLine,
  SourceSection,
  ImportedAt,
  Project,
  MemoryClass,
  ExternalId,
}
