use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use cortex_entities::fact;
use cortex_shared::AppError;

use crate::store::Store;

const TRANSITION_THRESHOLD: f64 = 0.05;

/// Bucket granularity for `GET /api/timeline` (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineBucket {
  Day,
  Week,
  Month,
}

impl FromStr for TimelineBucket {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "day" => Ok(Self::Day),
      "week" => Ok(Self::Week),
      "month" => Ok(Self::Month),
      other => Err(AppError::invalid_argument(format!("unknown timeline bucket {other:?}"))),
    }
  }
}

impl TimelineBucket {
  /// Bucket start date for `date`: unchanged for `Day`, the ISO Monday of its
  /// week for `Week`, the first of its month for `Month` (spec §4.6).
  fn start_of(self, date: NaiveDate) -> NaiveDate {
    match self {
      Self::Day => date,
      Self::Week => {
        let days_from_monday = date.weekday().num_days_from_monday();
        date - chrono::Duration::days(i64::from(days_from_monday))
      }
      Self::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
    }
  }
}

/// A detected change in a subject's facts over time (spec §4.6 transition
/// detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
  Superseded,
  Refined,
  Decayed,
  Contradicted,
  Expanded,
}

impl TransitionKind {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Superseded => "superseded",
      Self::Refined => "refined",
      Self::Decayed => "decayed",
      Self::Contradicted => "contradicted",
      Self::Expanded => "expanded",
    }
  }
}

#[derive(Debug, Clone)]
pub struct Transition {
  pub kind: TransitionKind,
  pub fact_id: i64,
  pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineBucketEntry {
  pub start: Option<NaiveDate>,
  pub facts: Vec<fact::Model>,
  pub related_facts: Vec<fact::Model>,
  pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceSample {
  pub bucket_start: NaiveDate,
  pub avg_confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineResult {
  pub buckets: Vec<TimelineBucketEntry>,
  pub confidence_trend: Vec<ConfidenceSample>,
}

impl Store {
  /// `GET /api/timeline?subject=S&from=...&to=...&bucket=...&min_confidence=C&related={true|false}`
  /// (spec §4.6): buckets a subject's fact history and detects
  /// superseded/refined/decayed/contradicted/expanded transitions.
  #[allow(clippy::too_many_arguments)]
  pub async fn timeline(
    &self,
    subject: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    bucket: TimelineBucket,
    min_confidence: f64,
    include_related: bool,
  ) -> Result<TimelineResult, AppError> {
    let mut history = self.get_facts_by_subject_all(subject).await?;
    if history.is_empty() {
      return Err(AppError::not_found(format!("no facts found for subject {subject:?}")));
    }
    history.sort_by_key(|f| f.created_at);

    let in_range = |date: NaiveDate| from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t);

    let mut related_by_bucket: Vec<(NaiveDate, fact::Model)> = Vec::new();
    if include_related {
      for root in &history {
        if root.confidence < min_confidence {
          continue;
        }
        for edge in self.edges_from(root.id).await? {
          if let Ok(target) = self.get_fact(edge.target_fact_id).await {
            if target.subject.to_lowercase() != subject.to_lowercase() {
              let date = target.created_at.date_naive();
              if in_range(date) {
                related_by_bucket.push((bucket.start_of(date), target));
              }
            }
          }
        }
      }
    }

    let transitions = detect_transitions(&history, min_confidence);

    let mut by_bucket: BTreeMap<NaiveDate, TimelineBucketEntry> = BTreeMap::new();

    for fact in history.into_iter().filter(|f| in_range(f.created_at.date_naive())) {
      let start = bucket.start_of(fact.created_at.date_naive());
      let entry = by_bucket.entry(start).or_insert_with(|| TimelineBucketEntry {
        start: Some(start),
        ..Default::default()
      });
      entry.facts.push(fact);
    }

    for (start, fact) in related_by_bucket {
      let entry = by_bucket.entry(start).or_insert_with(|| TimelineBucketEntry {
        start: Some(start),
        ..Default::default()
      });
      entry.related_facts.push(fact);
    }

    for transition in transitions {
      let date = transition.created_at.date_naive();
      if !in_range(date) {
        continue;
      }
      let start = bucket.start_of(date);
      let entry = by_bucket.entry(start).or_insert_with(|| TimelineBucketEntry {
        start: Some(start),
        ..Default::default()
      });
      entry.transitions.push(transition.transition);
    }

    detect_expanded(&mut by_bucket);

    let buckets: Vec<TimelineBucketEntry> = by_bucket.values().cloned().collect();

    let confidence_trend = buckets
      .iter()
      .filter(|b| !b.facts.is_empty())
      .filter_map(|b| {
        b.start.map(|start| {
          let sum: f64 = b.facts.iter().map(|f| f.confidence).sum();
          ConfidenceSample {
            bucket_start: start,
            avg_confidence: sum / b.facts.len() as f64,
          }
        })
      })
      .collect();

    Ok(TimelineResult { buckets, confidence_trend })
  }
}

struct DatedTransition {
  created_at: chrono::DateTime<chrono::Utc>,
  transition: Transition,
}

/// Detects superseded/refined/decayed transitions along each predicate's
/// chronological chain, and contradicted among currently-active facts (spec
/// §4.6).
fn detect_transitions(history: &[fact::Model], min_confidence: f64) -> Vec<DatedTransition> {
  let mut by_predicate: std::collections::HashMap<String, Vec<&fact::Model>> = std::collections::HashMap::new();
  for fact in history {
    by_predicate.entry(fact.predicate.to_lowercase()).or_default().push(fact);
  }

  let mut out = Vec::new();

  for facts in by_predicate.values() {
    let mut ordered = facts.clone();
    ordered.sort_by_key(|f| f.created_at);

    for pair in ordered.windows(2) {
      let (prev, curr) = (pair[0], pair[1]);
      let delta = curr.confidence - prev.confidence;

      if prev.superseded_by == Some(curr.id) && delta > TRANSITION_THRESHOLD {
        out.push(DatedTransition {
          created_at: curr.created_at,
          transition: Transition {
            kind: TransitionKind::Superseded,
            fact_id: curr.id,
            detail: format!("supersedes fact {} with higher confidence", prev.id),
          },
        });
      } else if curr.subject.to_lowercase() == prev.subject.to_lowercase()
        && curr.object.to_lowercase() == prev.object.to_lowercase()
        && delta > TRANSITION_THRESHOLD
      {
        out.push(DatedTransition {
          created_at: curr.created_at,
          transition: Transition {
            kind: TransitionKind::Refined,
            fact_id: curr.id,
            detail: format!("reaffirms fact {} with higher confidence", prev.id),
          },
        });
      } else if delta < -TRANSITION_THRESHOLD || (prev.confidence >= min_confidence && curr.confidence < min_confidence) {
        out.push(DatedTransition {
          created_at: curr.created_at,
          transition: Transition {
            kind: TransitionKind::Decayed,
            fact_id: curr.id,
            detail: format!("confidence dropped from {} to {}", prev.confidence, curr.confidence),
          },
        });
      }
    }
  }

  let mut by_predicate_active: std::collections::HashMap<String, Vec<&fact::Model>> = std::collections::HashMap::new();
  for fact in history.iter().filter(|f| f.superseded_by.is_none()) {
    by_predicate_active.entry(fact.predicate.to_lowercase()).or_default().push(fact);
  }

  for facts in by_predicate_active.values() {
    let distinct_objects: HashSet<String> = facts.iter().map(|f| f.object.to_lowercase()).collect();
    if distinct_objects.len() > 1 {
      if let Some(newest) = facts.iter().max_by_key(|f| f.created_at) {
        out.push(DatedTransition {
          created_at: newest.created_at,
          transition: Transition {
            kind: TransitionKind::Contradicted,
            fact_id: newest.id,
            detail: "multiple active facts disagree on this predicate's object".to_owned(),
          },
        });
      }
    }
  }

  out
}

/// Marks a bucket `expanded` when it introduces a related subject not seen in
/// any earlier bucket (spec §4.6).
fn detect_expanded(by_bucket: &mut BTreeMap<NaiveDate, TimelineBucketEntry>) {
  let mut seen_subjects: HashSet<String> = HashSet::new();

  for (start, entry) in by_bucket.iter_mut() {
    let mut introduced = false;
    for fact in &entry.related_facts {
      if seen_subjects.insert(fact.subject.to_lowercase()) {
        introduced = true;
      }
    }
    if introduced {
      entry.transitions.push(Transition {
        kind: TransitionKind::Expanded,
        fact_id: 0,
        detail: format!("new related subjects appear in bucket starting {start}"),
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use cortex_shared::{ExtractionMethod, FactType};

  use crate::store::{NewFact, NewMemory};
  use crate::test_support::test_store;

  use super::*;

  async fn seed_fact(store: &Store, subject: &str, predicate: &str, object: &str, confidence: f64) -> i64 {
    let memory_id = store
      .add_memory(NewMemory {
        content: format!("{subject} {predicate} {object}"),
        source_file: "notes.md".to_owned(),
        source_line: None,
        source_section: None,
        project: None,
        memory_class: None,
        external_id: None,
      })
      .await
      .unwrap();

    store
      .add_fact(NewFact {
        memory_id,
        subject: subject.to_owned(),
        predicate: predicate.to_owned(),
        object: object.to_owned(),
        fact_type: FactType::Kv,
        confidence,
        decay_rate: None,
        extraction_method: ExtractionMethod::Rules,
        agent_id: None,
        source_quote: "quote".to_owned(),
      })
      .await
      .unwrap()
  }

  #[test]
  fn parses_bucket_kinds() {
    assert_eq!("day".parse::<TimelineBucket>().unwrap(), TimelineBucket::Day);
    assert!("fortnight".parse::<TimelineBucket>().is_err());
  }

  #[test]
  fn week_bucket_starts_on_monday() {
    let wednesday = NaiveDate::from_ymd_opt(2026, 7, 22).unwrap();
    assert_eq!(wednesday.weekday(), Weekday::Wed);
    let start = TimelineBucket::Week.start_of(wednesday);
    assert_eq!(start.weekday(), Weekday::Mon);
  }

  #[tokio::test]
  async fn buckets_facts_by_day() {
    let store = test_store().await;
    seed_fact(&store, "Alice", "role", "Engineer", 0.9).await;

    let result = store
      .timeline("Alice", None, None, TimelineBucket::Day, 0.0, false)
      .await
      .unwrap();

    assert_eq!(result.buckets.len(), 1);
    assert_eq!(result.confidence_trend.len(), 1);
  }

  #[tokio::test]
  async fn detects_contradicted_active_facts() {
    let store = test_store().await;
    seed_fact(&store, "Alice", "role", "Engineer", 0.8).await;
    seed_fact(&store, "Alice", "role", "Manager", 0.8).await;

    let result = store
      .timeline("Alice", None, None, TimelineBucket::Day, 0.0, false)
      .await
      .unwrap();

    let has_contradiction = result
      .buckets
      .iter()
      .flat_map(|b| &b.transitions)
      .any(|t| t.kind == TransitionKind::Contradicted);
    assert!(has_contradiction);
  }
}
