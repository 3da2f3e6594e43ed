#![cfg(test)]

use cortex_migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use crate::store::Store;

/// Opens an in-memory sqlite database, runs every migration, and wraps it in
/// a `Store`. Each call gets its own isolated database.
pub async fn test_store() -> Store {
  let db = Database::connect("sqlite::memory:")
    .await
    .expect("failed to open in-memory sqlite database");

  Migrator::up(&db, None).await.expect("failed to run migrations");

  Store::new(db)
}
