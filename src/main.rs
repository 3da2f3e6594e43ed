use std::collections::HashSet;
use std::sync::Arc;

use cortex_migration::{Migrator, MigratorTrait};
use cortex_server::utils::AppState;
use cortex_shared::{APP_CONFIG, AppError};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), AppError> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db = Database::connect(APP_CONFIG.database_url.as_str())
    .await
    .map_err(AppError::storage)?;

  // https://www.sea-ql.org/SeaORM/docs/migration/running-migration/#migrating-programmatically
  Migrator::up(&db, None).await.map_err(AppError::storage)?;
  refuse_unknown_migrations(&db).await?;

  let provider = build_provider()?;
  let store = cortex_core::Store::new(db);
  let state = AppState::new(store, provider);

  let addr = std::env::var("CORTEX_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
  cortex_server::server(&addr, state).await
}

/// Builds the configured LLM provider, if any. Cortex runs with rule-only
/// extraction and degraded answers when no provider is configured (spec
/// §4.7 step 2); an explicitly bad `CORTEX_LLM` flag or missing key is
/// still a startup error, since that's operator misconfiguration rather
/// than "no LLM on purpose".
fn build_provider() -> Result<Option<Arc<dyn cortex_ai::Provider>>, AppError> {
  if APP_CONFIG.cortex_llm.is_none() && APP_CONFIG.gemini_api_key.is_none() && APP_CONFIG.openrouter_api_key.is_none() {
    return Ok(None);
  }

  let flag = APP_CONFIG.cortex_llm.as_deref().unwrap_or("");
  let provider = cortex_ai::parse_llm_flag(flag, APP_CONFIG.gemini_api_key.as_deref(), APP_CONFIG.openrouter_api_key.as_deref())
    .map_err(AppError::provider)?;

  Ok(Some(provider))
}

/// Refuses to start if `seaql_migrations` names a migration the compiled
/// binary doesn't know about — a downgrade, or a newer binary's migration
/// applied against an older one (spec §6 "open refuses to run if the
/// stored version exceeds the binary's known maximum").
async fn refuse_unknown_migrations(db: &DatabaseConnection) -> Result<(), AppError> {
  let known: HashSet<String> = Migrator::migrations().iter().map(|m| m.name().to_owned()).collect();

  let rows = db
    .query_all(Statement::from_string(
      db.get_database_backend(),
      "SELECT version FROM seaql_migrations",
    ))
    .await
    .map_err(AppError::storage)?;

  for row in rows {
    let version: String = row.try_get("", "version").map_err(AppError::storage)?;
    if !known.contains(&version) {
      return Err(AppError::storage(anyhow::anyhow!(
        "database has applied migration {version:?} unknown to this binary; refusing to start"
      )));
    }
  }

  Ok(())
}
