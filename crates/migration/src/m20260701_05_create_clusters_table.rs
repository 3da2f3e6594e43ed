use sea_orm_migration::{
  prelude::*,
  schema::{big_integer, double, json, pk_bigint, string},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Clusters::Table)
          .if_not_exists()
          .col(pk_bigint(Clusters::Id))
          .col(string(Clusters::Name))
          .col(json(Clusters::Aliases))
          .col(json(Clusters::TopSubjects))
          .col(json(Clusters::Subjects))
          .col(json(Clusters::FactIds))
          .col(big_integer(Clusters::FactCount))
          .col(double(Clusters::AvgConfidence))
          .col(double(Clusters::Cohesion))
          .col(string(Clusters::Color))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Clusters::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Clusters {
  Table,
  Id,
  Name,
  Aliases,
  TopSubjects,
  Subjects,
  FactIds,
  FactCount,
  AvgConfidence,
  Cohesion,
  Color,
}
