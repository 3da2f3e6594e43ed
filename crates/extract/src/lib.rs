mod candidate;
pub use candidate::CandidateFact;

mod chunk;
pub use chunk::chunk_for_llm;

mod governor;
pub use governor::{GovernorConfig, govern};

mod kv;
pub use kv::extract_kv;

mod llm;
pub use llm::extract_with_llm;

mod nl;
pub use nl::extract_nl;

mod pipeline;
pub use pipeline::{ExtractMetadata, extract, extract_rules};

mod regex_scan;
pub use regex_scan::scan_literals;

mod scaffold;
pub use scaffold::strip_scaffold;

mod subject;
pub use subject::infer_subject;
