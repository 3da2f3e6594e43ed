use std::sync::Arc;

use cortex_ai::Provider;
use cortex_core::Store;

/// Shared state for every handler (spec §2 `AppState` composition): the
/// fact-graph store, and an optional LLM provider. When `provider` is absent
/// the Answer Engine degrades (spec §4.7 step 2) and ingestion runs
/// rule-only extraction.
#[derive(Clone)]
pub struct AppState {
  pub store: Store,
  pub provider: Option<Arc<dyn Provider>>,
}

impl AppState {
  #[must_use]
  pub const fn new(store: Store, provider: Option<Arc<dyn Provider>>) -> Self {
    Self { store, provider }
  }
}
