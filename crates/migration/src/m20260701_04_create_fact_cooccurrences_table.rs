use sea_orm_migration::{
  prelude::*,
  schema::big_integer,
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
          .table(FactCooccurrences::Table)
          .if_not_exists()
          .col(big_integer(FactCooccurrences::FactIdA))
          .col(big_integer(FactCooccurrences::FactIdB))
          .col(big_integer(FactCooccurrences::Count))
          .primary_key(
            Index::create()
              .col(FactCooccurrences::FactIdA)
              .col(FactCooccurrences::FactIdB),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_fact_cooccurrences_a")
              .from(FactCooccurrences::Table, FactCooccurrences::FactIdA)
              .to(Facts::Table, Facts::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_fact_cooccurrences_b")
              .from(FactCooccurrences::Table, FactCooccurrences::FactIdB)
              .to(Facts::Table, Facts::Id),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(FactCooccurrences::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum FactCooccurrences {
  Table,
  FactIdA,
  FactIdB,
  Count,
}
