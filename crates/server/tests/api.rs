use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use cortex_core::Store;
use cortex_migration::{Migrator, MigratorTrait};
use cortex_server::utils::AppState;
use sea_orm::Database;
use tower::ServiceExt;

async fn test_app() -> Router {
  let db = Database::connect("sqlite::memory:")
    .await
    .expect("failed to open in-memory sqlite database");
  Migrator::up(&db, None).await.expect("failed to run migrations");

  let state = AppState::new(Store::new(db), None);
  cortex_server::api::app().with_state(state)
}

fn json_body(value: &serde_json::Value) -> Body {
  Body::from(serde_json::to_vec(value).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
  let app = test_app().await;

  let response = app
    .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
  assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn ingest_then_facts_then_stats_roundtrip() {
  let app = test_app().await;

  let ingest_body = serde_json::json!({
    "content": "**Broker:** TradeStation\nStarted: 2026-01-15",
    "source": "notes/trading.md",
    "section": "Trading Setup",
    "format": "markdown",
  });

  let response = app
    .clone()
    .oneshot(
      Request::builder()
        .method(Method::POST)
        .uri("/api/ingest")
        .header("content-type", "application/json")
        .body(json_body(&ingest_body))
        .unwrap(),
    )
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let ingested: serde_json::Value = serde_json::from_slice(&body).unwrap();
  assert!(ingested["fact_ids"].as_array().is_some_and(|ids| !ids.is_empty()));

  let response = app
    .clone()
    .oneshot(
      Request::builder()
        .uri("/api/facts?subject=Trading%20Setup")
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let facts: serde_json::Value = serde_json::from_slice(&body).unwrap();
  assert!(!facts.as_array().unwrap().is_empty());

  let response = app
    .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
  assert_eq!(stats["total_memories"], 1);
}

#[tokio::test]
async fn facts_without_subject_or_memory_id_is_rejected() {
  let app = test_app().await;

  let response = app
    .oneshot(Request::builder().uri("/api/facts").body(Body::empty()).unwrap())
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
