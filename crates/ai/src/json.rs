use cortex_shared::AppError;
use serde::de::DeserializeOwned;

/// Strips a leading/trailing markdown code fence from an LLM completion, then
/// decodes the remainder as JSON (spec §4.4 "Common LLM response parsing").
///
/// Providers are asked for JSON but routinely wrap it in ```json ... ``` or
/// ``` ... ``` fences anyway; this undoes that before decoding.
pub fn parse_llm_json<T: DeserializeOwned>(content: &str) -> Result<T, AppError> {
  let stripped = strip_fence(content);
  serde_json::from_str(stripped)
    .map_err(|err| AppError::provider(format!("failed to parse LLM response as JSON: {err}")))
}

fn strip_fence(content: &str) -> &str {
  let trimmed = content.trim();
  let Some(after_open) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let after_first_line = match after_open.find('\n') {
    Some(idx) => &after_open[idx + 1..],
    None => after_open,
  };
  match after_first_line.rfind("```") {
    Some(idx) => after_first_line[..idx].trim(),
    None => after_first_line.trim(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Deserialize, PartialEq)]
  struct Point {
    x: i32,
    y: i32,
  }

  #[test]
  fn parses_bare_json() {
    let parsed: Point = parse_llm_json(r#"{"x": 1, "y": 2}"#).unwrap();
    assert_eq!(parsed, Point { x: 1, y: 2 });
  }

  #[test]
  fn strips_json_fence() {
    let content = "```json\n{\"x\": 3, \"y\": 4}\n```";
    let parsed: Point = parse_llm_json(content).unwrap();
    assert_eq!(parsed, Point { x: 3, y: 4 });
  }

  #[test]
  fn strips_bare_fence() {
    let content = "```\n{\"x\": 5, \"y\": 6}\n```";
    let parsed: Point = parse_llm_json(content).unwrap();
    assert_eq!(parsed, Point { x: 5, y: 6 });
  }

  #[test]
  fn rejects_malformed_json() {
    let err = parse_llm_json::<Point>("not json").unwrap_err();
    assert!(err.to_string().contains("500"));
  }
}
