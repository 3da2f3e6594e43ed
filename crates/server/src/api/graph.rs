use axum::Json;
use axum::extract::{Query, State};
use cortex_entities::{fact, fact_edge};
use cortex_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

use super::common::parse_bounded_int;

const MAX_DEPTH: u64 = 5;
const DEFAULT_DEPTH: u64 = 2;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GraphQuery {
  pub fact_id: Option<i64>,
  pub depth: Option<u64>,
  pub min_confidence: Option<f64>,
  pub agent: Option<String>,
  pub subject: Option<String>,
  pub limit: Option<u64>,
  pub offset: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GraphNode {
  pub fact: fact::Model,
  pub depth: u32,
  pub edges: Vec<fact_edge::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyntheticEdgeDto {
  pub from_fact_id: i64,
  pub to_fact_id: i64,
}

#[derive(Debug, Serialize, ToSchema, Default)]
pub struct GraphResponse {
  pub nodes: Vec<GraphNode>,
  pub synthetic_edges: Vec<SyntheticEdgeDto>,
}

/// `GET /api/graph?fact_id=ID&depth=D&min_confidence=C[&agent=A]` or
/// `?subject=S&limit=L&offset=O` (spec §4.6): BFS traversal from a root fact,
/// or facts for one subject with synthetic chain edges.
#[utoipa::path(
  get,
  path = "/api/graph",
  params(GraphQuery),
  responses((status = 200, description = "Traversal or subject view", body = GraphResponse))
)]
#[axum::debug_handler]
pub async fn graph(State(state): State<AppState>, Query(query): Query<GraphQuery>) -> Result<Json<GraphResponse>, AppError> {
  if let Some(fact_id) = query.fact_id {
    let depth = parse_bounded_int(query.depth, DEFAULT_DEPTH, 0, MAX_DEPTH) as u32;
    let min_confidence = query.min_confidence.unwrap_or(0.0);

    let traversal = state.store.traverse_graph(fact_id, depth, min_confidence).await?;

    let nodes: Vec<GraphNode> = traversal
      .nodes
      .into_iter()
      .filter(|n| query.agent.as_deref().is_none_or(|agent| n.fact.agent_id.as_deref() == Some(agent)))
      .map(|n| GraphNode {
        fact: n.fact,
        depth: n.depth,
        edges: n.edges,
      })
      .collect();

    return Ok(Json(GraphResponse { nodes, synthetic_edges: Vec::new() }));
  }

  if let Some(subject) = query.subject.as_deref() {
    let limit = parse_bounded_int(query.limit, 50, 1, 500);
    let offset = query.offset.unwrap_or(0);

    let mut facts = state.store.get_facts_by_subject(subject).await?;
    facts.sort_by_key(|f| f.id);
    let page: Vec<fact::Model> = facts.into_iter().skip(offset as usize).take(limit as usize).collect();

    let synthetic_edges: Vec<SyntheticEdgeDto> = page
      .windows(2)
      .map(|pair| SyntheticEdgeDto {
        from_fact_id: pair[0].id,
        to_fact_id: pair[1].id,
      })
      .collect();

    let nodes: Vec<GraphNode> = page
      .into_iter()
      .map(|fact| GraphNode { fact, depth: 0, edges: Vec::new() })
      .collect();

    return Ok(Json(GraphResponse { nodes, synthetic_edges }));
  }

  Err(AppError::invalid_argument("one of fact_id or subject is required"))
}
