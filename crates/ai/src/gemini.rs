use async_trait::async_trait;
use cortex_shared::AppError;
use serde_json::{Value, json};

use crate::provider::{CompleteOptions, Provider, ResponseFormat};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative Language (Gemini) provider (spec §4.8).
pub struct GeminiProvider {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
  model: String,
}

impl GeminiProvider {
  #[must_use]
  pub fn new(api_key: String, model: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_owned(),
      api_key,
      model: model.into(),
    }
  }

  #[must_use]
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }
}

#[async_trait]
impl Provider for GeminiProvider {
  async fn complete(&self, prompt: &str, opts: &CompleteOptions) -> Result<String, AppError> {
    let model = opts.model.as_deref().unwrap_or(&self.model);
    let url = format!(
      "{}/models/{}:generateContent?key={}",
      self.base_url, model, self.api_key
    );

    let mut generation_config = serde_json::Map::new();
    if let Some(max_tokens) = opts.max_tokens {
      generation_config.insert("maxOutputTokens".to_owned(), json!(max_tokens));
    }
    generation_config.insert("temperature".to_owned(), json!(opts.temperature.unwrap_or(0.7)));
    if opts.format == ResponseFormat::Json {
      generation_config.insert(
        "responseMimeType".to_owned(),
        json!("application/json"),
      );
    }

    let mut body = json!({
      "contents": [{
        "role": "user",
        "parts": [{ "text": prompt }],
      }],
      "generationConfig": generation_config,
    });

    if let Some(system) = &opts.system {
      body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    let response = self
      .client
      .post(&url)
      .json(&body)
      .send()
      .await
      .map_err(|err| AppError::provider(format!("gemini transport error: {err}")))?;

    let status = response.status();
    let body: Value = response
      .json()
      .await
      .map_err(|err| AppError::provider(format!("gemini response decode error: {err}")))?;

    if !status.is_success() {
      return Err(AppError::provider(format!(
        "gemini returned {status}: {body}"
      )));
    }

    body["candidates"][0]["content"]["parts"][0]["text"]
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| AppError::provider("gemini response missing candidate text"))
  }

  fn name(&self) -> &str {
    "google"
  }
}
