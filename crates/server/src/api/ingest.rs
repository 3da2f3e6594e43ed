use axum::Json;
use axum::extract::State;
use cortex_core::{IngestOutcome, IngestRecord};
use cortex_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

/// Request body for `POST /api/ingest` (spec §6 Ingestion record).
#[derive(Debug, Deserialize, ToSchema)]
pub struct IngestRequest {
  pub content: String,
  pub source: String,
  pub section: Option<String>,
  pub project: Option<String>,
  pub memory_class: Option<String>,
  pub external_id: Option<String>,
  pub format: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
  pub memory_id: i64,
  pub fact_ids: Vec<i64>,
}

/// `POST /api/ingest` (spec §6): runs the extraction/governor/persistence
/// pipeline for one record, using the configured LLM provider when present.
#[utoipa::path(
  post,
  path = "/api/ingest",
  request_body = IngestRequest,
  responses(
    (status = 200, description = "Ingested memory and its facts", body = IngestResponse),
    (status = 400, description = "Empty content")
  )
)]
#[axum::debug_handler]
pub async fn ingest(State(state): State<AppState>, Json(payload): Json<IngestRequest>) -> Result<Json<IngestResponse>, AppError> {
  let record = IngestRecord {
    content: payload.content,
    source: payload.source,
    section: payload.section,
    project: payload.project,
    memory_class: payload.memory_class,
    external_id: payload.external_id,
    format: payload.format,
  };

  let provider = state.provider.as_deref();
  let IngestOutcome { memory_id, fact_ids } = state.store.ingest(record, provider).await?;

  Ok(Json(IngestResponse { memory_id, fact_ids }))
}
