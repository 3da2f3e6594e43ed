use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
  pub status: &'static str,
}

/// Liveness probe.
#[utoipa::path(
  get,
  path = "/api/health",
  responses((status = 200, description = "Service is up", body = Health))
)]
#[axum::debug_handler]
pub async fn health() -> Json<Health> {
  Json(Health { status: "ok" })
}
