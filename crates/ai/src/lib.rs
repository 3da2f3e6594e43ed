mod flag;
pub use flag::parse_llm_flag;

mod gemini;
pub use gemini::GeminiProvider;

mod json;
pub use json::parse_llm_json;

mod openrouter;
pub use openrouter::OpenRouterProvider;

mod provider;
pub use provider::{CompleteOptions, Provider, ResponseFormat};
