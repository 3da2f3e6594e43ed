//! Batched LLM refiners (spec §1 C4): each reads existing facts from the
//! store, proposes a change via an LLM call, and writes it back through
//! `cortex_core::Store`. All four share the task-pool + bounded-semaphore
//! shape in `concurrency`.

mod classification;
pub use classification::{ClassificationConfig, ClassificationSummary, classify_facts};

mod concurrency;
pub use concurrency::{chunked, run_batched};

mod conflict;
pub use conflict::{ConflictConfig, ConflictPair, ConflictSummary, find_conflicts, resolve_conflicts};

mod enrichment;
pub use enrichment::{EnrichmentConfig, enrich_memory};

mod summarization;
pub use summarization::{SummarizationConfig, SummarizationSummary, summarize_clusters};
