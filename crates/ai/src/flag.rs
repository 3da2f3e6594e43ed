use std::sync::Arc;

use crate::{gemini::GeminiProvider, openrouter::OpenRouterProvider, provider::Provider};

const DEFAULT_PROVIDER_MODEL: &str = "google/gemini-2.5-flash";

/// Resolves a `--llm "<provider>/<model>"` style flag (spec §4.8 `ParseLLMFlag`)
/// into a constructed `Provider`, defaulting an empty flag to
/// `google/gemini-2.5-flash`.
///
/// API keys are taken from `cortex_shared::AppConfig` rather than the flag
/// itself, matching spec §4.8's separation of provider selection from secrets.
pub fn parse_llm_flag(
  flag: &str,
  gemini_api_key: Option<&str>,
  openrouter_api_key: Option<&str>,
) -> anyhow::Result<Arc<dyn Provider>> {
  let flag = if flag.trim().is_empty() {
    DEFAULT_PROVIDER_MODEL
  } else {
    flag.trim()
  };

  let (provider, model) = flag
    .split_once('/')
    .ok_or_else(|| anyhow::anyhow!("invalid llm flag {flag:?}, expected \"provider/model\""))?;

  match provider {
    "google" => {
      let api_key = gemini_api_key
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is required for provider \"google\""))?;
      Ok(Arc::new(GeminiProvider::new(api_key.to_owned(), model)))
    }
    "openrouter" => {
      let api_key = openrouter_api_key
        .ok_or_else(|| anyhow::anyhow!("OPENROUTER_API_KEY is required for provider \"openrouter\""))?;
      Ok(Arc::new(OpenRouterProvider::new(api_key.to_owned(), model)))
    }
    other => Err(anyhow::anyhow!("unknown llm provider {other:?}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_flag_defaults_to_gemini_flash() {
    let provider = parse_llm_flag("", Some("key"), None).unwrap();
    assert_eq!(provider.name(), "google");
  }

  #[test]
  fn parses_openrouter_flag() {
    let provider = parse_llm_flag("openrouter/anthropic/claude-3.5-sonnet", None, Some("key")).unwrap();
    assert_eq!(provider.name(), "openrouter");
  }

  #[test]
  fn missing_api_key_errors() {
    let err = parse_llm_flag("google/gemini-2.5-flash", None, None).unwrap_err();
    assert!(err.to_string().contains("GEMINI_API_KEY"));
  }

  #[test]
  fn unknown_provider_errors() {
    let err = parse_llm_flag("unknown/model", None, None).unwrap_err();
    assert!(err.to_string().contains("unknown llm provider"));
  }
}
