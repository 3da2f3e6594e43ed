use axum::Json;
use axum::extract::{Query, State};
use cortex_entities::{fact, fact_cooccurrence};
use cortex_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

use super::common::parse_bounded_int;

const MAX_SUBJECT_GROUPS: u64 = 50;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ClusterQuery {
  pub limit: Option<u64>,
  pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClusterNodeDto {
  pub subject: String,
  pub facts: Vec<fact::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyntheticEdgeDto {
  pub from_fact_id: i64,
  pub to_fact_id: i64,
  pub subject: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClusterViewResponse {
  pub nodes: Vec<ClusterNodeDto>,
  pub edges: Vec<SyntheticEdgeDto>,
  pub cooccurrences: Vec<fact_cooccurrence::Model>,
}

/// `GET /api/cluster?limit=L[&q=T]` (spec §4.6): a live sample of subject
/// groups, distinct from the persisted `/api/clusters`.
#[utoipa::path(
  get,
  path = "/api/cluster",
  params(ClusterQuery),
  responses((status = 200, description = "Sampled subject groups", body = ClusterViewResponse))
)]
#[axum::debug_handler]
pub async fn cluster(State(state): State<AppState>, Query(query): Query<ClusterQuery>) -> Result<Json<ClusterViewResponse>, AppError> {
  let limit = parse_bounded_int(query.limit, 20, 1, MAX_SUBJECT_GROUPS);
  let view = state.store.live_cluster_sample(limit, query.q.as_deref()).await?;

  let nodes = view
    .nodes
    .into_iter()
    .map(|n| ClusterNodeDto { subject: n.subject, facts: n.facts })
    .collect();

  let edges = view
    .edges
    .into_iter()
    .map(|e| SyntheticEdgeDto {
      from_fact_id: e.from_fact_id,
      to_fact_id: e.to_fact_id,
      subject: e.subject,
    })
    .collect();

  Ok(Json(ClusterViewResponse { nodes, edges, cooccurrences: view.cooccurrences }))
}
