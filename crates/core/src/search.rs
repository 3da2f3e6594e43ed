use cortex_entities::{fact, memory};
use cortex_shared::AppError;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::store::Store;

/// One retrieved memory, scored for relevance (spec §4.6 `/api/search`, §4.7
/// Answer Engine retrieval step).
#[derive(Debug, Clone)]
pub struct SearchResult {
  pub memory: memory::Model,
  pub score: f64,
}

impl Store {
  /// `GET /api/search?q=T` (spec §4.6): keyword search memories, fetch their
  /// facts, then filter by `contains(lower(subject+predicate+object), lower(q))`;
  /// falls back to a direct LIKE scan over facts when nothing survives that.
  pub async fn search_memories(&self, query: &str, limit: u64) -> Result<Vec<SearchResult>, AppError> {
    let needle = query.to_lowercase();
    if needle.trim().is_empty() {
      return Ok(Vec::new());
    }

    let all = cortex_entities::MemoryEntity::find()
      .all(self.connection())
      .await
      .map_err(|err| AppError::storage(err))?;

    let matching_memories: Vec<memory::Model> = all.into_iter().filter(|m| m.content.to_lowercase().contains(&needle)).collect();

    let memory_ids: Vec<i64> = matching_memories.iter().map(|m| m.id).collect();
    let facts = self.get_facts_by_memory_ids(&memory_ids).await?;

    let mut qualifying_memory_ids = Vec::new();
    for f in &facts {
      let haystack = format!("{} {} {}", f.subject, f.predicate, f.object).to_lowercase();
      if haystack.contains(&needle) && !qualifying_memory_ids.contains(&f.memory_id) {
        qualifying_memory_ids.push(f.memory_id);
      }
    }

    let mut scored: Vec<SearchResult> = matching_memories
      .into_iter()
      .filter(|m| qualifying_memory_ids.contains(&m.id))
      .map(|m| {
        let haystack = m.content.to_lowercase();
        let score = keyword_score(&haystack, &needle);
        SearchResult { memory: m, score }
      })
      .collect();

    if scored.is_empty() {
      return self.search_facts_like(&needle, limit).await;
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit as usize);
    Ok(scored)
  }

  /// Fallback path: search subject/predicate/object directly over every fact,
  /// then surface the owning memories (spec §4.6: "falls back to direct
  /// SQL-LIKE over facts").
  async fn search_facts_like(&self, needle: &str, limit: u64) -> Result<Vec<SearchResult>, AppError> {
    let facts = fact::Entity::find()
      .filter(fact::Column::SupersededBy.is_null())
      .all(self.connection())
      .await
      .map_err(|err| AppError::storage(err))?;

    let mut memory_ids = Vec::new();
    for f in &facts {
      let haystack = format!("{} {} {}", f.subject, f.predicate, f.object).to_lowercase();
      if haystack.contains(needle) && !memory_ids.contains(&f.memory_id) {
        memory_ids.push(f.memory_id);
      }
    }

    let mut results = Vec::new();
    for id in memory_ids.into_iter().take(limit as usize) {
      if let Ok(m) = self.get_memory(id).await {
        results.push(SearchResult { memory: m, score: 0.5 });
      }
    }
    Ok(results)
  }
}

/// Cheap relevance proxy: fraction of the query's occurrences relative to
/// content length, favoring shorter memories with a denser match.
fn keyword_score(haystack: &str, needle: &str) -> f64 {
  let occurrences = haystack.matches(needle).count() as f64;
  let len = haystack.len().max(1) as f64;
  (occurrences * 100.0 / len).min(1.0)
}

#[cfg(test)]
mod tests {
  use cortex_shared::{ExtractionMethod, FactType};

  use crate::store::{NewFact, NewMemory};
  use crate::test_support::test_store;

  #[tokio::test]
  async fn search_finds_matching_memory() {
    let store = test_store().await;
    let memory_id = store
      .add_memory(NewMemory {
        content: "alpha bravo charlie".to_owned(),
        source_file: "memory.md".to_owned(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap();

    store
      .add_fact(NewFact {
        memory_id,
        subject: "bravo".to_owned(),
        predicate: "role".to_owned(),
        object: "engineer".to_owned(),
        fact_type: FactType::Kv,
        confidence: 0.9,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "quote".to_owned(),
      })
      .await
      .unwrap();

    let results = store.search_memories("bravo", 10).await.unwrap();
    assert_eq!(results.len(), 1);
  }

  #[tokio::test]
  async fn falls_back_to_fact_like_scan_when_memory_content_has_no_matching_fact() {
    let store = test_store().await;
    let memory_id = store
      .add_memory(NewMemory {
        content: "unrelated content entirely".to_owned(),
        source_file: "memory.md".to_owned(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap();

    store
      .add_fact(NewFact {
        memory_id,
        subject: "delta".to_owned(),
        predicate: "role".to_owned(),
        object: "engineer".to_owned(),
        fact_type: FactType::Kv,
        confidence: 0.9,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "quote".to_owned(),
      })
      .await
      .unwrap();

    let results = store.search_memories("delta", 10).await.unwrap();
    assert_eq!(results.len(), 1);
  }

  #[tokio::test]
  async fn empty_query_returns_nothing() {
    let store = test_store().await;
    let results = store.search_memories("", 10).await.unwrap();
    assert!(results.is_empty());
  }
}
