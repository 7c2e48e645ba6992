// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod bias;
pub mod cache;
pub mod dimensions;
pub mod lexicon;
pub mod report;

// Analysis pipeline (completion adapter, response parser, fallback extractor)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::analyze::ai_adapter;
pub use crate::api::{router, AppState};
pub use crate::report::{AnalysisReport, ExtractedClaim};
