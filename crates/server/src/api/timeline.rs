use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use cortex_core::TimelineBucket;
use cortex_entities::fact;
use cortex_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct TimelineQuery {
  pub subject: String,
  pub from: Option<String>,
  pub to: Option<String>,
  #[serde(default = "default_bucket")]
  pub bucket: String,
  pub min_confidence: Option<f64>,
  #[serde(default)]
  pub related: bool,
}

fn default_bucket() -> String {
  "day".to_owned()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionDto {
  pub kind: String,
  pub fact_id: i64,
  pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineBucketDto {
  pub start: Option<NaiveDate>,
  pub facts: Vec<fact::Model>,
  pub related_facts: Vec<fact::Model>,
  pub transitions: Vec<TransitionDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfidenceSampleDto {
  pub bucket_start: NaiveDate,
  pub avg_confidence: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineResponse {
  pub buckets: Vec<TimelineBucketDto>,
  pub confidence_trend: Vec<ConfidenceSampleDto>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| AppError::invalid_argument(format!("invalid date {raw:?}: {err}")))
}

/// `GET /api/timeline?subject=S&from=...&to=...&bucket={day|week|month}&min_confidence=C&related={true|false}`
/// (spec §4.6): buckets a subject's fact history and reports detected
/// transitions plus a confidence trend.
#[utoipa::path(
  get,
  path = "/api/timeline",
  params(TimelineQuery),
  responses((status = 200, description = "Timeline buckets", body = TimelineResponse))
)]
#[axum::debug_handler]
pub async fn timeline(State(state): State<AppState>, Query(query): Query<TimelineQuery>) -> Result<Json<TimelineResponse>, AppError> {
  let from = query.from.as_deref().map(parse_date).transpose()?;
  let to = query.to.as_deref().map(parse_date).transpose()?;
  let bucket: TimelineBucket = query.bucket.parse()?;
  let min_confidence = query.min_confidence.unwrap_or(0.0);

  let result = state
    .store
    .timeline(&query.subject, from, to, bucket, min_confidence, query.related)
    .await?;

  let buckets = result
    .buckets
    .into_iter()
    .map(|b| TimelineBucketDto {
      start: b.start,
      facts: b.facts,
      related_facts: b.related_facts,
      transitions: b
        .transitions
        .into_iter()
        .map(|t| TransitionDto {
          kind: t.kind.as_str().to_owned(),
          fact_id: t.fact_id,
          detail: t.detail,
        })
        .collect(),
    })
    .collect();

  let confidence_trend = result
    .confidence_trend
    .into_iter()
    .map(|s| ConfidenceSampleDto {
      bucket_start: s.bucket_start,
      avg_confidence: s.avg_confidence,
    })
    .collect();

  Ok(Json(TimelineResponse { buckets, confidence_trend }))
}
