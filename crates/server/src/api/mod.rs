use axum::{
  Json, Router,
  routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::utils::AppState;

mod common;

mod answer;
mod cluster;
mod clusters;
mod facts;
mod graph;
mod health;
mod impact;
mod ingest;
mod search;
mod stats;
mod timeline;

pub use answer::{AnswerRequest, answer as answer_handler};
pub use cluster::{ClusterQuery, ClusterViewResponse, cluster as cluster_handler};
pub use clusters::{ClusterDetailResponse, cluster_detail, list_clusters};
pub use facts::{FactsQuery, facts as facts_handler};
pub use graph::{GraphQuery, GraphResponse, graph as graph_handler};
pub use health::{Health, health};
pub use impact::{ImpactQuery, ImpactResponse, impact as impact_handler};
pub use ingest::{IngestRequest, IngestResponse, ingest as ingest_handler};
pub use search::{SearchQuery, SearchResponse, search as search_handler};
pub use stats::{Stats, stats as stats_handler};
pub use timeline::{TimelineQuery, TimelineResponse, timeline as timeline_handler};

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Cortex API",
    version = "0.1.0",
    description = "Personal knowledge base: search, graph traversal, impact, timeline, and grounded answers over a fact graph"
  ),
  paths(
    health::health,
    search::search,
    facts::facts,
    graph::graph,
    cluster::cluster,
    clusters::list_clusters,
    clusters::cluster_detail,
    impact::impact,
    timeline::timeline,
    stats::stats,
    answer::answer,
    ingest::ingest,
  ),
  components(schemas(
    Health,
    SearchQuery,
    SearchResponse,
    search::SearchResultDto,
    FactsQuery,
    GraphQuery,
    GraphResponse,
    graph::GraphNode,
    graph::SyntheticEdgeDto,
    ClusterQuery,
    ClusterViewResponse,
    cluster::ClusterNodeDto,
    cluster::SyntheticEdgeDto,
    ClusterDetailResponse,
    ImpactQuery,
    ImpactResponse,
    impact::ImpactNodeDto,
    TimelineQuery,
    TimelineResponse,
    timeline::TimelineBucketDto,
    timeline::TransitionDto,
    timeline::ConfidenceSampleDto,
    Stats,
    AnswerRequest,
    cortex_core::AnswerResult,
    cortex_core::Citation,
    IngestRequest,
    IngestResponse,
    cortex_entities::memory::Model,
    cortex_entities::fact::Model,
    cortex_entities::fact_edge::Model,
    cortex_entities::cluster::Model,
    cortex_entities::fact_cooccurrence::Model,
  ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
  Json(ApiDoc::openapi())
}

pub fn app() -> Router<AppState> {
  Router::new()
    .route("/api/health", get(health))
    .route("/api/search", get(search_handler))
    .route("/api/facts", get(facts_handler))
    .route("/api/graph", get(graph_handler))
    .route("/api/cluster", get(cluster_handler))
    .route("/api/clusters", get(list_clusters))
    .route("/api/clusters/{id}", get(cluster_detail))
    .route("/api/impact", get(impact_handler))
    .route("/api/timeline", get(timeline_handler))
    .route("/api/stats", get(stats_handler))
    .route("/api/answer", post(answer_handler))
    .route("/api/ingest", post(ingest_handler))
    .route("/openapi.json", get(openapi_json))
    .merge(Scalar::with_url("/openapi/", ApiDoc::openapi()))
}
