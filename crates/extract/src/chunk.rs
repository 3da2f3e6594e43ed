const OVERLAP_CHARS: usize = 200;
const CONTEXT_FRACTION: f64 = 0.75;
const CHARS_PER_TOKEN: usize = 4;

/// Splits `text` into chunks that each fit roughly `CONTEXT_FRACTION` of
/// `context_window_tokens` (spec §4.1.7), preferring to cut at a paragraph
/// boundary in the last third of the window, with `OVERLAP_CHARS` of overlap
/// between consecutive chunks.
#[must_use]
pub fn chunk_for_llm(text: &str, context_window_tokens: usize) -> Vec<String> {
  let chunk_chars = ((context_window_tokens as f64 * CONTEXT_FRACTION) as usize * CHARS_PER_TOKEN).max(1);

  if text.chars().count() <= chunk_chars {
    return vec![text.to_owned()];
  }

  let chars: Vec<char> = text.chars().collect();
  let mut chunks = Vec::new();
  let mut start = 0;

  while start < chars.len() {
    let ideal_end = (start + chunk_chars).min(chars.len());

    let end = if ideal_end == chars.len() {
      ideal_end
    } else {
      find_paragraph_break(&chars, start, ideal_end).unwrap_or(ideal_end)
    };

    let chunk: String = chars[start..end].iter().collect();
    chunks.push(chunk);

    if end >= chars.len() {
      break;
    }

    start = end.saturating_sub(OVERLAP_CHARS);
  }

  chunks
}

/// Looks for `\n\n` within the last third of `[start, ideal_end)`, returning
/// the index just after the break.
fn find_paragraph_break(chars: &[char], start: usize, ideal_end: usize) -> Option<usize> {
  let window_len = ideal_end - start;
  let last_third_start = start + (window_len * 2 / 3);

  let mut i = ideal_end.saturating_sub(1);
  while i > last_third_start {
    if i > 0 && chars[i - 1] == '\n' && chars[i] == '\n' {
      return Some(i + 1);
    }
    i -= 1;
  }

  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_chunk_for_short_text() {
    let chunks = chunk_for_llm("hello world", 8192);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0], "hello world");
  }

  #[test]
  fn splits_long_text_with_overlap() {
    let paragraph = "word ".repeat(40);
    let text = format!("{paragraph}\n\n{paragraph}\n\n{paragraph}");
    let chunks = chunk_for_llm(&text, 10);
    assert!(chunks.len() > 1);
  }

  #[test]
  fn consecutive_chunks_overlap() {
    let text = "a".repeat(2000);
    let chunks = chunk_for_llm(&text, 10);
    assert!(chunks.len() >= 2);
  }
}
