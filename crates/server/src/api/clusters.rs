use axum::Json;
use axum::extract::{Path, State};
use cortex_entities::{cluster, fact};
use cortex_shared::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::AppState;

/// `GET /api/clusters` (spec §4.6): list persisted clusters, already ordered
/// by fact_count desc, cohesion desc, name asc (spec §4.5).
#[utoipa::path(
  get,
  path = "/api/clusters",
  responses((status = 200, description = "Persisted clusters", body = Vec<cluster::Model>))
)]
#[axum::debug_handler]
pub async fn list_clusters(State(state): State<AppState>) -> Result<Json<Vec<cluster::Model>>, AppError> {
  Ok(Json(state.store.list_clusters().await?))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClusterDetailResponse {
  pub cluster: cluster::Model,
  pub facts: Vec<fact::Model>,
}

/// `GET /api/clusters/{id}` (spec §4.6): one persisted cluster and its active
/// facts.
#[utoipa::path(
  get,
  path = "/api/clusters/{id}",
  params(("id" = i64, Path, description = "Cluster id")),
  responses(
    (status = 200, description = "Cluster detail", body = ClusterDetailResponse),
    (status = 404, description = "Cluster not found")
  )
)]
#[axum::debug_handler]
pub async fn cluster_detail(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ClusterDetailResponse>, AppError> {
  let detail = state.store.get_cluster_detail(id, 200).await?;
  Ok(Json(ClusterDetailResponse {
    cluster: detail.cluster,
    facts: detail.facts,
  }))
}
