use async_trait::async_trait;
use cortex_shared::AppError;

/// `opts.format` (spec §4.8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
  #[default]
  Text,
  Json,
}

/// Options recognized by every `Provider::complete` call (spec §4.8 `opts`).
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
  pub max_tokens: Option<u32>,
  pub temperature: Option<f32>,
  pub format: ResponseFormat,
  pub system: Option<String>,
  pub model: Option<String>,
}

impl CompleteOptions {
  #[must_use]
  pub fn json() -> Self {
    Self {
      format: ResponseFormat::Json,
      ..Self::default()
    }
  }

  #[must_use]
  pub fn with_system(mut self, system: impl Into<String>) -> Self {
    self.system = Some(system.into());
    self
  }

  #[must_use]
  pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
    self.max_tokens = Some(max_tokens);
    self
  }
}

/// Uniform completion interface over external LLM providers (spec §4.8 / C8).
///
/// Cancellation (spec §5) is the caller's responsibility: every call site wraps
/// `complete` in `tokio::time::timeout` with the operation's budget rather than
/// threading an explicit cancellation token through the trait, matching how the
/// teacher's `generate_text`/`generate_object` rely on the enclosing task being
/// dropped rather than accepting a context parameter.
#[async_trait]
pub trait Provider: Send + Sync {
  async fn complete(&self, prompt: &str, opts: &CompleteOptions) -> Result<String, AppError>;

  fn name(&self) -> &str;
}
