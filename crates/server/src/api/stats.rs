use axum::Json;
use axum::extract::State;
use cortex_shared::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct Stats {
  pub total_memories: u64,
  pub total_active_facts: u64,
  pub total_edges: u64,
  pub total_clusters: u64,
  pub unclustered_facts: u64,
}

/// `GET /api/stats` (spec §4.6): totals.
#[utoipa::path(
  get,
  path = "/api/stats",
  responses((status = 200, description = "Store totals", body = Stats))
)]
#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, AppError> {
  let total_memories = state.store.count_memories().await?;
  let total_active_facts = state.store.count_active_facts().await?;
  let total_edges = state.store.count_edges().await?;
  let total_clusters = state.store.list_clusters().await?.len() as u64;
  let unclustered_facts = state.store.count_unclustered_facts().await?;

  Ok(Json(Stats {
    total_memories,
    total_active_facts,
    total_edges,
    total_clusters,
    unclustered_facts,
  }))
}
