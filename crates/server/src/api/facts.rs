use axum::Json;
use axum::extract::{Query, State};
use cortex_entities::fact;
use cortex_shared::AppError;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct FactsQuery {
  pub subject: Option<String>,
  pub memory_id: Option<i64>,
}

/// `GET /api/facts?subject=S | memory_id=M` (spec §4.6): active facts by
/// subject (case-insensitive exact) or by owning memory.
#[utoipa::path(
  get,
  path = "/api/facts",
  params(FactsQuery),
  responses((status = 200, description = "Active facts", body = Vec<fact::Model>))
)]
#[axum::debug_handler]
pub async fn facts(State(state): State<AppState>, Query(query): Query<FactsQuery>) -> Result<Json<Vec<fact::Model>>, AppError> {
  let facts = match (query.subject.as_deref(), query.memory_id) {
    (Some(subject), _) => state.store.get_facts_by_subject(subject).await?,
    (None, Some(memory_id)) => state.store.get_facts_by_memory_ids(&[memory_id]).await?,
    (None, None) => return Err(AppError::invalid_argument("one of subject or memory_id is required")),
  };

  Ok(Json(facts))
}
