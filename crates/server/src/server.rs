use axum::http::Method;
use cortex_shared::AppError;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::utils::{AppState, shutdown_signal};

/// Binds `addr` and serves the API until a shutdown signal arrives (spec §4.6:
/// every JSON response carries `Access-Control-Allow-Origin: *`).
pub async fn server(addr: &str, state: AppState) -> Result<(), AppError> {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST]);

  let app = api::app().with_state(state).layer(cors);

  let listener = TcpListener::bind(addr).await.map_err(|err| AppError::storage(err))?;
  tracing::info!(%addr, "cortex server listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|err| AppError::storage(err))
}
