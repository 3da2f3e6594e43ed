use serde::Serialize;

/// `parseBoundedInt(raw, default, min, max)` (spec §4.6 Common guards): clamps
/// an optional numeric query parameter into `[min, max]`, substituting
/// `default` when absent or unparsable.
#[must_use]
pub fn parse_bounded_int(raw: Option<u64>, default: u64, min: u64, max: u64) -> u64 {
  raw.unwrap_or(default).clamp(min, max)
}

/// `addPaginationMeta(meta, limit, offset, total, returned)` (spec §4.6).
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
  pub limit: u64,
  pub offset: u64,
  pub returned: u64,
  pub total: u64,
  pub has_more: bool,
}

#[must_use]
pub fn pagination_meta(limit: u64, offset: u64, total: u64, returned: u64) -> PaginationMeta {
  PaginationMeta {
    limit,
    offset,
    returned,
    total,
    has_more: offset + returned < total,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clamps_into_bounds() {
    assert_eq!(parse_bounded_int(Some(500), 10, 1, 100), 100);
    assert_eq!(parse_bounded_int(Some(0), 10, 1, 100), 1);
    assert_eq!(parse_bounded_int(None, 10, 1, 100), 10);
  }

  #[test]
  fn has_more_reflects_remaining_rows() {
    let meta = pagination_meta(10, 0, 25, 10);
    assert!(meta.has_more);
    let meta = pagination_meta(10, 20, 25, 5);
    assert!(!meta.has_more);
  }
}
