use axum::Json;
use axum::extract::State;
use cortex_core::AnswerResult;
use cortex_shared::AppError;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::utils::AppState;

use super::common::parse_bounded_int;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
  pub query: String,
  pub limit: Option<u64>,
}

/// `Answer({query, search_options}) -> {answer, citations, degraded, reason}`
/// (spec §4.7): retrieves memories via the search backend, then runs the
/// Answer Engine over them.
#[utoipa::path(
  post,
  path = "/api/answer",
  request_body = AnswerRequest,
  responses((status = 200, description = "Answer with citations", body = AnswerResult))
)]
#[axum::debug_handler]
pub async fn answer(State(state): State<AppState>, Json(payload): Json<AnswerRequest>) -> Result<Json<AnswerResult>, AppError> {
  let limit = parse_bounded_int(payload.limit, 5, 1, 50);
  let results = state.store.search_memories(&payload.query, limit).await?;
  let result = cortex_core::answer(&payload.query, results, state.provider.clone()).await;
  Ok(Json(result))
}
