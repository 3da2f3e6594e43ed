use chrono::Utc;
use cortex_entities::memory::{self, Entity as MemoryEntity};
use cortex_shared::AppError;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

use super::Store;

/// Fields accepted by `AddMemory` (spec §4.3). `id`, `imported_at` are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMemory {
  pub content: String,
  pub source_file: String,
  pub source_line: Option<i32>,
  pub source_section: Option<String>,
  pub project: Option<String>,
  pub memory_class: Option<String>,
  pub external_id: Option<String>,
}

impl Store {
  /// `AddMemory(m) -> id` (spec §4.3). `content` must be non-empty after
  /// trimming (spec §3 Memory invariant).
  pub async fn add_memory(&self, m: NewMemory) -> Result<i64, AppError> {
    let content = m.content.trim();
    if content.is_empty() {
      return Err(AppError::invalid_argument("memory content must not be empty"));
    }

    let active = memory::ActiveModel {
      content: Set(content.to_owned()),
      source_file: Set(m.source_file),
      source_line: Set(m.source_line),
      source_section: Set(m.source_section),
      imported_at: Set(Utc::now()),
      project: Set(m.project),
      memory_class: Set(m.memory_class),
      external_id: Set(m.external_id),
      ..Default::default()
    };

    let inserted = active.insert(&self.db).await.map_err(|err| AppError::storage(err))?;
    Ok(inserted.id)
  }

  /// `GetMemory(id)` (spec §4.3).
  pub async fn get_memory(&self, id: i64) -> Result<memory::Model, AppError> {
    MemoryEntity::find_by_id(id)
      .one(&self.db)
      .await
      .map_err(|err| AppError::storage(err))?
      .ok_or_else(|| AppError::not_found(format!("memory {id} not found")))
  }

  /// `CountMemories()`, used by `GET /api/stats` (spec §4.6).
  pub async fn count_memories(&self) -> Result<u64, AppError> {
    MemoryEntity::find().count(&self.db).await.map_err(|err| AppError::storage(err))
  }
}

#[cfg(test)]
mod tests {
  use crate::test_support::test_store;

  use super::*;

  #[tokio::test]
  async fn add_and_get_memory_roundtrips() {
    let store = test_store().await;

    let id = store
      .add_memory(NewMemory {
        content: "hello world".to_owned(),
        source_file: "notes.md".to_owned(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap();

    let fetched = store.get_memory(id).await.unwrap();
    assert_eq!(fetched.content, "hello world");
  }

  #[tokio::test]
  async fn rejects_empty_content() {
    let store = test_store().await;
    let err = store
      .add_memory(NewMemory {
        content: "   ".to_owned(),
        source_file: String::new(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap_err();
    assert!(err.to_string().contains("400"));
  }

  #[tokio::test]
  async fn missing_memory_is_not_found() {
    let store = test_store().await;
    let err = store.get_memory(9999).await.unwrap_err();
    assert!(err.to_string().contains("404"));
  }
}
