use std::collections::{HashMap, HashSet};

use cortex_shared::AppError;

use crate::store::{NewCluster, Store};

const STRONG_COOCCURRENCE_THRESHOLD: u64 = 2;
const MIN_COMPONENT_SIZE: usize = 3;
const MAX_ALIASES: usize = 8;
const MAX_TOP_SUBJECTS: usize = 5;

const PALETTE: &[&str] = &[
  "#4C72B0", "#DD8452", "#55A868", "#C44E52", "#8172B2", "#937860", "#DA8BC3", "#8C8C8C", "#CCB974", "#64B5CD",
];

/// `normalize(subject)` (spec §4.5): lowercase, trimmed, whitespace-collapsed.
pub(crate) fn normalize(subject: &str) -> String {
  subject.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

struct SubjectStats {
  display_counts: HashMap<String, u64>,
  total: u64,
}

impl SubjectStats {
  fn display_form(&self) -> String {
    self
      .display_counts
      .iter()
      .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
      .map(|(form, _)| form.clone())
      .unwrap_or_default()
  }
}

/// Rebuilds the full cluster set from active facts (spec §4.5 / C5) and
/// persists it via `Store::replace_clusters`. Returns the number of clusters
/// written.
pub async fn rebuild_clusters(store: &Store) -> Result<usize, AppError> {
  let facts = store.all_active_facts().await?;

  let mut by_memory: HashMap<i64, HashSet<String>> = HashMap::new();
  let mut stats: HashMap<String, SubjectStats> = HashMap::new();
  let mut facts_by_subject: HashMap<String, Vec<&cortex_entities::fact::Model>> = HashMap::new();

  for fact in &facts {
    let key = normalize(&fact.subject);
    if key.is_empty() {
      continue;
    }

    by_memory.entry(fact.memory_id).or_default().insert(key.clone());

    let entry = stats.entry(key.clone()).or_insert_with(|| SubjectStats {
      display_counts: HashMap::new(),
      total: 0,
    });
    *entry.display_counts.entry(fact.subject.clone()).or_insert(0) += 1;
    entry.total += 1;

    facts_by_subject.entry(key).or_default().push(fact);
  }

  let mut weights: HashMap<(String, String), u64> = HashMap::new();
  for subjects in by_memory.values() {
    let mut ordered: Vec<&String> = subjects.iter().collect();
    ordered.sort();
    for i in 0..ordered.len() {
      for j in (i + 1)..ordered.len() {
        *weights
          .entry((ordered[i].clone(), ordered[j].clone()))
          .or_insert(0) += 1;
      }
    }
  }

  let mut adjacency: HashMap<String, Vec<(String, u64)>> = HashMap::new();
  for ((a, b), weight) in &weights {
    adjacency.entry(a.clone()).or_default().push((b.clone(), *weight));
    adjacency.entry(b.clone()).or_default().push((a.clone(), *weight));
  }

  let all_subjects: Vec<String> = stats.keys().cloned().collect();
  let components = connected_components(&all_subjects, &adjacency);
  let components = merge_small_components(components, &weights);

  let mut clusters = Vec::new();
  for (index, component) in components.iter().enumerate() {
    let mut by_freq: Vec<&String> = component.iter().collect();
    by_freq.sort_by(|a, b| {
      let freq_a = stats.get(*a).map_or(0, |s| s.total);
      let freq_b = stats.get(*b).map_or(0, |s| s.total);
      freq_b.cmp(&freq_a).then_with(|| a.cmp(b))
    });

    let name = by_freq
      .first()
      .and_then(|key| stats.get(*key))
      .map(SubjectStats::display_form)
      .unwrap_or_default();

    let top_subjects: Vec<String> = by_freq
      .iter()
      .take(MAX_TOP_SUBJECTS)
      .filter_map(|key| stats.get(**key).map(SubjectStats::display_form))
      .collect();

    let aliases: Vec<String> = by_freq
      .iter()
      .skip(1)
      .take(MAX_ALIASES)
      .filter_map(|key| stats.get(**key).map(SubjectStats::display_form))
      .collect();

    let subjects: Vec<String> = by_freq
      .iter()
      .filter_map(|key| stats.get(**key).map(SubjectStats::display_form))
      .collect();

    let mut fact_ids = Vec::new();
    let mut confidence_sum = 0.0;
    for key in component {
      if let Some(facts) = facts_by_subject.get(key) {
        for fact in facts {
          fact_ids.push(fact.id);
          confidence_sum += fact.confidence;
        }
      }
    }
    fact_ids.sort_unstable();

    let fact_count = fact_ids.len() as i64;
    let avg_confidence = if fact_count > 0 { confidence_sum / fact_count as f64 } else { 0.0 };

    let cohesion = compute_cohesion(component, &weights);

    clusters.push(NewCluster {
      name,
      aliases,
      top_subjects,
      subjects,
      fact_ids,
      fact_count,
      avg_confidence,
      cohesion,
      color: PALETTE[index % PALETTE.len()].to_owned(),
    });
  }

  clusters.sort_by(|a, b| {
    b.fact_count
      .cmp(&a.fact_count)
      .then_with(|| b.cohesion.partial_cmp(&a.cohesion).unwrap_or(std::cmp::Ordering::Equal))
      .then_with(|| a.name.cmp(&b.name))
  });

  let count = clusters.len();
  store.replace_clusters(clusters).await?;
  Ok(count)
}

fn connected_components(subjects: &[String], adjacency: &HashMap<String, Vec<(String, u64)>>) -> Vec<Vec<String>> {
  let mut visited = HashSet::new();
  let mut components = Vec::new();

  for subject in subjects {
    if visited.contains(subject) {
      continue;
    }

    let mut component = Vec::new();
    let mut stack = vec![subject.clone()];

    while let Some(current) = stack.pop() {
      if !visited.insert(current.clone()) {
        continue;
      }
      component.push(current.clone());

      if let Some(neighbors) = adjacency.get(&current) {
        for (neighbor, weight) in neighbors {
          if *weight >= STRONG_COOCCURRENCE_THRESHOLD && !visited.contains(neighbor) {
            stack.push(neighbor.clone());
          }
        }
      }
    }

    component.sort();
    components.push(component);
  }

  components
}

fn merge_small_components(
  components: Vec<Vec<String>>,
  weights: &HashMap<(String, String), u64>,
) -> Vec<Vec<String>> {
  let (mut small, mut large): (Vec<_>, Vec<_>) = components
    .into_iter()
    .partition(|c| c.len() < MIN_COMPONENT_SIZE);

  if large.is_empty() {
    // Nothing to merge into; keep small components as-is.
    large.append(&mut small);
    return large;
  }

  for component in small {
    let scored: Vec<(usize, u64)> = large
      .iter()
      .enumerate()
      .map(|(index, candidate)| {
        let cross_weight: u64 = component
          .iter()
          .flat_map(|a| candidate.iter().map(move |b| cross_edge_weight(a, b, weights)))
          .sum();
        (index, cross_weight)
      })
      .collect();

    let best = scored.iter().max_by(|(ia, wa), (ib, wb)| {
      wa.cmp(wb)
        .then_with(|| large[*ia].len().cmp(&large[*ib].len()))
        .then_with(|| large[*ib][0].cmp(&large[*ia][0]))
    });

    match best.filter(|(_, weight)| *weight > 0) {
      Some((index, _)) => {
        large[*index].extend(component);
        large[*index].sort();
      }
      None => large.push(component),
    }
  }

  large
}

fn cross_edge_weight(a: &str, b: &str, weights: &HashMap<(String, String), u64>) -> u64 {
  let key = if a < b { (a.to_owned(), b.to_owned()) } else { (b.to_owned(), a.to_owned()) };
  weights.get(&key).copied().unwrap_or(0)
}

fn compute_cohesion(component: &[String], weights: &HashMap<(String, String), u64>) -> f64 {
  let n = component.len();
  if n <= 1 {
    return 1.0;
  }

  let mut intra_edges = 0u64;
  for i in 0..n {
    for j in (i + 1)..n {
      if cross_edge_weight(&component[i], &component[j], weights) >= STRONG_COOCCURRENCE_THRESHOLD {
        intra_edges += 1;
      }
    }
  }

  let possible = (n * (n - 1) / 2) as f64;
  (intra_edges as f64 / possible).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
  use cortex_shared::{ExtractionMethod, FactType};

  use crate::store::{NewFact, NewMemory};
  use crate::test_support::test_store;

  use super::*;

  async fn seed(store: &Store, memory_subjects: &[&[&str]]) {
    for subjects in memory_subjects {
      let memory_id = store
        .add_memory(NewMemory {
          content: "content".to_owned(),
          source_file: "notes.md".to_owned(),
          source_line: None,
          source_section: None,
          project: None,
          memory_class: None,
          external_id: None,
        })
        .await
        .unwrap();

      for subject in *subjects {
        store
          .add_fact(NewFact {
            memory_id,
            subject: (*subject).to_owned(),
            predicate: "predicate".to_owned(),
            object: "object".to_owned(),
            fact_type: FactType::Kv,
            confidence: 0.9,
            decay_rate: None,
            extraction_method: ExtractionMethod::Rules,
            agent_id: None,
            source_quote: "predicate: object".to_owned(),
          })
          .await
          .unwrap();
      }
    }
  }

  #[tokio::test]
  async fn rebuild_is_deterministic_across_runs() {
    let store = test_store().await;
    seed(
      &store,
      &[
        &["Alice", "Bob", "Project X"],
        &["Alice", "Bob", "Project X"],
        &["Alice", "Bob"],
      ],
    )
    .await;

    let first_count = rebuild_clusters(&store).await.unwrap();
    let first = store.list_clusters().await.unwrap();

    let second_count = rebuild_clusters(&store).await.unwrap();
    let second = store.list_clusters().await.unwrap();

    assert_eq!(first_count, second_count);
    assert_eq!(
      first.iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
      second.iter().map(|c| c.name.clone()).collect::<Vec<_>>()
    );
  }

  #[tokio::test]
  async fn strongly_cooccurring_subjects_cluster_together() {
    let store = test_store().await;
    seed(
      &store,
      &[
        &["Alice", "Bob", "Carol"],
        &["Alice", "Bob", "Carol"],
        &["Alice", "Bob", "Carol"],
      ],
    )
    .await;

    rebuild_clusters(&store).await.unwrap();
    let clusters = store.list_clusters().await.unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].fact_count, 9);
  }
}
