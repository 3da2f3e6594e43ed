use std::env;
use std::sync::LazyLock;

fn optional_env(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.is_empty())
}

/// Environment-sourced configuration (spec §6 "Environment variables").
///
/// CLI argument parsing and config-file loading are explicitly out of scope (spec §1);
/// every field here is read straight from the process environment, `dotenvy`-loaded
/// the way the teacher's `AppEnv` does.
pub struct AppConfig {
  /// Path to the embedded sqlite database, or `sqlite::memory:` for an ephemeral store.
  pub database_url: String,
  /// `"provider/model"`, e.g. `"google/gemini-2.5-flash"`. Empty/unset selects the default.
  pub cortex_llm: Option<String>,
  pub cortex_llm_endpoint: Option<String>,
  pub cortex_llm_api_key: Option<String>,
  pub openrouter_api_key: Option<String>,
  pub gemini_api_key: Option<String>,
}

impl AppConfig {
  fn new() -> Self {
    dotenvy::dotenv().ok();

    Self {
      database_url: optional_env("DATABASE_URL")
        .unwrap_or_else(|| "sqlite://cortex.db?mode=rwc".to_owned()),
      cortex_llm: optional_env("CORTEX_LLM"),
      cortex_llm_endpoint: optional_env("CORTEX_LLM_ENDPOINT"),
      cortex_llm_api_key: optional_env("CORTEX_LLM_API_KEY"),
      openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
      gemini_api_key: optional_env("GEMINI_API_KEY").or_else(|| optional_env("GOOGLE_API_KEY")),
    }
  }
}

pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::new);
