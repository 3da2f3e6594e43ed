use cortex_ai::{CompleteOptions, Provider, parse_llm_json};
use cortex_shared::{ExtractionMethod, FactType};
use serde::Deserialize;

use crate::candidate::CandidateFact;
use crate::chunk::chunk_for_llm;

const DEFAULT_CONTEXT_WINDOW_TOKENS: usize = 8192;

#[derive(Debug, Deserialize)]
struct LlmFactResponse {
  facts: Vec<LlmFact>,
}

#[derive(Debug, Deserialize)]
struct LlmFact {
  subject: String,
  predicate: String,
  object: String,
  #[serde(default)]
  fact_type: Option<String>,
  #[serde(default)]
  confidence: Option<f64>,
  #[serde(default)]
  source_quote: Option<String>,
}

const SYSTEM_PROMPT: &str = "You extract structured facts from personal notes. \
Return strict JSON of the shape {\"facts\": [{\"subject\": str, \"predicate\": str, \"object\": str, \
\"fact_type\": one of kv|relationship|preference|temporal|identity|location|decision|state|config, \
\"confidence\": number 0..1, \"source_quote\": str (must be an exact substring of the input)}]}. \
Only extract facts actually stated in the text. Return no prose, JSON only.";

/// Stage 7: optional LLM extraction (spec §4.1.7). Never fails the pipeline —
/// a provider error or malformed response is logged and skipped, degrading to
/// rule-only output.
pub async fn extract_with_llm(
  provider: &dyn Provider,
  text: &str,
  subject: &str,
) -> Vec<CandidateFact> {
  let chunks = chunk_for_llm(text, DEFAULT_CONTEXT_WINDOW_TOKENS);
  let mut facts = Vec::new();

  for chunk in chunks {
    match extract_chunk(provider, &chunk, subject).await {
      Ok(mut chunk_facts) => facts.append(&mut chunk_facts),
      Err(err) => {
        tracing::warn!(error = %err, "llm extraction failed for chunk, skipping");
      }
    }
  }

  facts
}

async fn extract_chunk(
  provider: &dyn Provider,
  chunk: &str,
  subject: &str,
) -> anyhow::Result<Vec<CandidateFact>> {
  let opts = CompleteOptions::json().with_system(SYSTEM_PROMPT);
  let prompt = format!("Subject context: {subject}\n\nText:\n{chunk}");

  let completion = provider
    .complete(&prompt, &opts)
    .await
    .map_err(|err| anyhow::anyhow!("{err}"))?;

  let parsed: LlmFactResponse = parse_llm_json(&completion).map_err(|err| anyhow::anyhow!("{err}"))?;

  Ok(
    parsed
      .facts
      .into_iter()
      .filter_map(|f| {
        let fact_type = f
          .fact_type
          .as_deref()
          .and_then(|t| t.parse::<FactType>().ok())
          .unwrap_or(FactType::Kv);

        if f.object.trim().is_empty() || f.predicate.trim().is_empty() {
          return None;
        }

        Some(CandidateFact {
          subject: if f.subject.trim().is_empty() {
            subject.to_owned()
          } else {
            f.subject
          },
          predicate: f.predicate,
          object: f.object,
          fact_type,
          confidence: f.confidence.unwrap_or(0.75).clamp(0.0, 1.0),
          extraction_method: ExtractionMethod::Llm,
          source_quote: f.source_quote.unwrap_or_else(|| chunk.to_owned()),
        })
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use cortex_shared::AppError;

  use super::*;

  struct StubProvider;

  #[async_trait]
  impl Provider for StubProvider {
    async fn complete(&self, _prompt: &str, _opts: &CompleteOptions) -> Result<String, AppError> {
      Ok(r#"{"facts": [{"subject": "Alice", "predicate": "role", "object": "engineer", "fact_type": "kv", "confidence": 0.8}]}"#.to_owned())
    }

    fn name(&self) -> &str {
      "stub"
    }
  }

  #[tokio::test]
  async fn collects_facts_from_provider() {
    let provider = StubProvider;
    let facts = extract_with_llm(&provider, "Alice works as an engineer.", "Alice").await;
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].predicate, "role");
    assert_eq!(facts[0].extraction_method, ExtractionMethod::Llm);
  }
}
