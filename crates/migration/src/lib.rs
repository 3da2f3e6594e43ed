pub use sea_orm_migration::*;

pub mod m20260701_01_create_memories_table;
pub mod m20260701_02_create_facts_table;
pub mod m20260701_03_create_fact_edges_table;
pub mod m20260701_04_create_fact_cooccurrences_table;
pub mod m20260701_05_create_clusters_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260701_01_create_memories_table::Migration),
      Box::new(m20260701_02_create_facts_table::Migration),
      Box::new(m20260701_03_create_fact_edges_table::Migration),
      Box::new(m20260701_04_create_fact_cooccurrences_table::Migration),
      Box::new(m20260701_05_create_clusters_table::Migration),
    ]
  }
}
