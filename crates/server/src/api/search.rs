use axum::Json;
use axum::extract::{Query, State};
use cortex_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

use super::common::{PaginationMeta, pagination_meta, parse_bounded_int};

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SearchQuery {
  pub q: String,
  pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResultDto {
  pub memory_id: i64,
  pub content: String,
  pub source_file: String,
  pub score: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
  pub results: Vec<SearchResultDto>,
  pub meta: PaginationMeta,
}

/// `GET /api/search?q=T&limit=L` (spec §4.6): keyword search over memory
/// content, falling back to a direct scan over facts.
#[utoipa::path(
  get,
  path = "/api/search",
  params(SearchQuery),
  responses((status = 200, description = "Matching memories", body = SearchResponse))
)]
#[axum::debug_handler]
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Result<Json<SearchResponse>, AppError> {
  let limit = parse_bounded_int(query.limit, 10, 1, 100);
  let results = state.store.search_memories(&query.q, limit).await?;

  let dtos: Vec<SearchResultDto> = results
    .into_iter()
    .map(|r| SearchResultDto {
      memory_id: r.memory.id,
      content: r.memory.content,
      source_file: r.memory.source_file,
      score: r.score,
    })
    .collect();

  let meta = pagination_meta(limit, 0, dtos.len() as u64, dtos.len() as u64);
  Ok(Json(SearchResponse { results: dtos, meta }))
}
