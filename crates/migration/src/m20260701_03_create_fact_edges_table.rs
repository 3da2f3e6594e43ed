use sea_orm_migration::{
  prelude::*,
  schema::{big_integer, double, pk_bigint, string},
};

use crate::m20260701_02_create_facts_table::Facts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(FactEdges::Table)
          .if_not_exists()
          .col(pk_bigint(FactEdges::Id))
          .col(big_integer(FactEdges::SourceFactId))
          .col(big_integer(FactEdges::TargetFactId))
          .col(string(FactEdges::EdgeType))
          .col(double(FactEdges::Confidence))
          .col(string(FactEdges::Source))
          .foreign_key(
            ForeignKey::create()
              .name("fk_fact_edges_source")
              .from(FactEdges::Table, FactEdges::SourceFactId)
              .to(Facts::Table, Facts::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_fact_edges_target")
              .from(FactEdges::Table, FactEdges::TargetFactId)
              .to(Facts::Table, Facts::Id),
          )
          .to_owned(),
      )
      .await?;

    // (source, target, type) uniqueness — an edge is redundant if this triple already
    // exists (spec §3 `FactEdge` invariant), enforced here rather than re-checked on
    // every insert.
    manager
      .create_index(
        Index::create()
          .name("idx_fact_edges_natural_key")
          .table(FactEdges::Table)
          .col(FactEdges::SourceFactId)
          .col(FactEdges::TargetFactId)
          .col(FactEdges::EdgeType)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(FactEdges::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum FactEdges {
  Table,
  Id,
  SourceFactId,
  TargetFactId,
  EdgeType,
  Confidence,
  Source,
}
