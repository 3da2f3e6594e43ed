use axum::Json;
use axum::extract::{Query, State};
use cortex_core::PredicateGroup;
use cortex_entities::fact;
use cortex_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

use super::common::{PaginationMeta, pagination_meta, parse_bounded_int};

const MAX_DEPTH: u64 = 5;
const DEFAULT_DEPTH: u64 = 3;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ImpactQuery {
  pub subject: String,
  pub depth: Option<u64>,
  pub limit: Option<u64>,
  pub offset: Option<u64>,
  pub min_confidence: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImpactNodeDto {
  pub fact: fact::Model,
  pub depth: u32,
  pub group: String,
  pub connected_count: usize,
  pub relevance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImpactResponse {
  pub nodes: Vec<ImpactNodeDto>,
  pub depth: u32,
  pub meta: PaginationMeta,
}

/// `GET /api/impact?subject=S&depth=D&limit=L&offset=O&min_confidence=C`
/// (spec §4.6): traverses from every active root fact for `subject`, ranks
/// by relevance, and pages the result.
#[utoipa::path(
  get,
  path = "/api/impact",
  params(ImpactQuery),
  responses((status = 200, description = "Ranked impact nodes", body = ImpactResponse))
)]
#[axum::debug_handler]
pub async fn impact(State(state): State<AppState>, Query(query): Query<ImpactQuery>) -> Result<Json<ImpactResponse>, AppError> {
  let depth = parse_bounded_int(query.depth, DEFAULT_DEPTH, 0, MAX_DEPTH) as u32;
  let limit = parse_bounded_int(query.limit, 20, 1, 200);
  let offset = query.offset.unwrap_or(0);
  let min_confidence = query.min_confidence.unwrap_or(0.0);

  let result = state.store.impact(&query.subject, depth, min_confidence, limit, offset).await?;

  let nodes: Vec<ImpactNodeDto> = result
    .nodes
    .into_iter()
    .map(|n| ImpactNodeDto {
      fact: n.fact,
      depth: n.depth,
      group: group_name(n.group).to_owned(),
      connected_count: n.connected_count,
      relevance: n.relevance,
    })
    .collect();

  let meta = pagination_meta(limit, offset, result.total as u64, nodes.len() as u64);
  Ok(Json(ImpactResponse { nodes, depth, meta }))
}

const fn group_name(group: PredicateGroup) -> &'static str {
  group.as_str()
}
