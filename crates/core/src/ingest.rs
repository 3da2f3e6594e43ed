use cortex_ai::Provider;
use cortex_extract::{CandidateFact, ExtractMetadata, extract, extract_rules};
use cortex_shared::AppError;

use crate::store::{NewFact, NewMemory, Store};

/// An ingestion record as delivered by a connector (spec §6).
#[derive(Debug, Clone)]
pub struct IngestRecord {
  pub content: String,
  pub source: String,
  pub section: Option<String>,
  pub project: Option<String>,
  pub memory_class: Option<String>,
  pub external_id: Option<String>,
  pub format: Option<String>,
}

/// Outcome of ingesting one record: the stored memory plus the facts written
/// for it.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
  pub memory_id: i64,
  pub fact_ids: Vec<i64>,
}

impl Store {
  /// Runs the full pipeline for one record: extraction (rules, plus LLM when
  /// a provider is supplied) → quality governor → persistence as a `Memory`
  /// and its `Fact`s, recording pairwise cooccurrence within the memory (spec
  /// §1 dataflow: "ingest text → rule + LLM extraction → quality governor →
  /// persistence").
  pub async fn ingest(&self, record: IngestRecord, provider: Option<&dyn Provider>) -> Result<IngestOutcome, AppError> {
    let metadata = ExtractMetadata {
      source_file: &record.source,
      source_section: record.section.as_deref(),
      format: record.format.as_deref(),
    };

    let facts: Vec<CandidateFact> = match provider {
      Some(provider) => extract(&record.content, &metadata, Some(provider)).await,
      None => {
        // No provider configured: run rules only, still through the governor
        // so the stored output honors the same quality bar.
        let rule_facts = extract_rules(&record.content, &metadata);
        let config = if metadata.source_file.contains("auto-capture") || metadata.source_file.contains("auto_capture")
        {
          cortex_extract::GovernorConfig::auto_capture_profile()
        } else {
          cortex_extract::GovernorConfig::default_profile()
        };
        cortex_extract::govern(rule_facts, &config)
      }
    };

    let memory_id = self
      .add_memory(NewMemory {
        content: record.content,
        source_file: record.source,
        source_line: None,
        source_section: record.section,
        project: record.project,
        memory_class: record.memory_class,
        external_id: record.external_id,
      })
      .await?;

    let mut fact_ids = Vec::with_capacity(facts.len());
    for candidate in facts {
      let id = self
        .add_fact(NewFact {
          memory_id,
          subject: candidate.subject,
          predicate: candidate.predicate,
          object: candidate.object,
          fact_type: candidate.fact_type,
          confidence: candidate.confidence,
          decay_rate: Some(candidate.decay_rate()),
          extraction_method: candidate.extraction_method,
          agent_id: None,
          source_quote: candidate.source_quote,
        })
        .await?;
      fact_ids.push(id);
    }

    for i in 0..fact_ids.len() {
      for j in (i + 1)..fact_ids.len() {
        self.record_cooccurrence(fact_ids[i], fact_ids[j]).await?;
      }
    }

    Ok(IngestOutcome { memory_id, fact_ids })
  }
}
