/// Stage 1: scaffold stripping (spec §4.1.1). Only applied to auto-capture
/// input — conversation-capture transcripts carry headers and fenced
/// "untrusted metadata" blocks that are not memory content.
const SCAFFOLD_PREFIXES: &[&str] = &[
  "## conversation capture",
  "channel:",
  "### user",
  "### assistant",
  "current time:",
];

const UNTRUSTED_METADATA_MARKER: &str = "(untrusted metadata)";

/// Removes scaffold lines and the body of fenced blocks that immediately
/// follow an "untrusted metadata" marker, preserving the ordering of the
/// remaining lines.
#[must_use]
pub fn strip_scaffold(text: &str) -> String {
  let mut out = Vec::new();
  let mut lines = text.lines().peekable();

  while let Some(line) = lines.next() {
    let lower = line.trim().to_lowercase();

    if SCAFFOLD_PREFIXES.iter().any(|p| lower.starts_with(p)) {
      continue;
    }

    if lower.contains(UNTRUSTED_METADATA_MARKER) {
      // Skip straight through to (and including) the fence that opens next,
      // then everything up to its closing fence.
      while let Some(next) = lines.peek() {
        if next.trim_start().starts_with("```") {
          lines.next();
          break;
        }
        lines.next();
      }
      for next in lines.by_ref() {
        if next.trim_start().starts_with("```") {
          break;
        }
      }
      continue;
    }

    out.push(line);
  }

  out.join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_scaffold_headers() {
    let text = "## Conversation Capture\nChannel: #general\n### User\nhello\n### Assistant\nhi there";
    let stripped = strip_scaffold(text);
    assert_eq!(stripped, "hello\nhi there");
  }

  #[test]
  fn strips_untrusted_metadata_fence() {
    let text = "real content\n(untrusted metadata)\n```\n{\"sender\": \"bob\"}\n```\nmore content";
    let stripped = strip_scaffold(text);
    assert_eq!(stripped, "real content\nmore content");
  }

  #[test]
  fn preserves_ordering_of_plain_text() {
    let text = "line one\nline two\nline three";
    assert_eq!(strip_scaffold(text), text);
  }
}
