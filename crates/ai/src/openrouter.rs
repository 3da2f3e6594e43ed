use async_trait::async_trait;
use cortex_shared::AppError;
use serde_json::{Value, json};

use crate::provider::{CompleteOptions, Provider, ResponseFormat};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter provider (spec §4.8).
pub struct OpenRouterProvider {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
  model: String,
}

impl OpenRouterProvider {
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
impl Provider for OpenRouterProvider {
  async fn complete(&self, prompt: &str, opts: &CompleteOptions) -> Result<String, AppError> {
    let model = opts.model.as_deref().unwrap_or(&self.model);
    let url = format!("{}/chat/completions", self.base_url);

    let mut messages = Vec::new();
    if let Some(system) = &opts.system {
      messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": prompt }));

    let mut body = json!({
      "model": model,
      "messages": messages,
    });

    if let Some(max_tokens) = opts.max_tokens {
      body["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = opts.temperature {
      body["temperature"] = json!(temperature);
    }
    if opts.format == ResponseFormat::Json {
      body["response_format"] = json!({ "type": "json_object" });
    }

    let response = self
      .client
      .post(&url)
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await
      .map_err(|err| AppError::provider(format!("openrouter transport error: {err}")))?;

    let status = response.status();
    let body: Value = response
      .json()
      .await
      .map_err(|err| AppError::provider(format!("openrouter response decode error: {err}")))?;

    if !status.is_success() {
      return Err(AppError::provider(format!(
        "openrouter returned {status}: {body}"
      )));
    }

    body["choices"][0]["message"]["content"]
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| AppError::provider("openrouter response missing message content"))
  }

  fn name(&self) -> &str {
    "openrouter"
  }
}
