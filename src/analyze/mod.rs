// src/analyze/mod.rs
//! Analysis pipeline entry: cache lookup, completion call, reply parsing.

pub mod ai_adapter;
pub mod extractor;
pub mod parser;

use tracing::debug;

// Re-export convenient types.
pub use ai_adapter::{
    CompletionClient, CompletionError, DisabledProvider, DynCompletionClient, MockProvider,
    OpenAiProvider,
};

use crate::cache::{fingerprint, ResultCache};
use crate::lexicon::LexiconStore;
use crate::report::AnalysisReport;

/// Run one analysis: fingerprint -> cache -> completion -> parse -> store.
///
/// Completion failures propagate to the caller for user-visible messaging;
/// parse failures never do (the parser returns a degraded report instead).
/// Concurrent requests for the same fingerprint may both miss and both
/// write; last writer wins.
pub async fn analyze_content(
    lexicon: &LexiconStore,
    cache: &ResultCache,
    client: &dyn CompletionClient,
    content: &str,
    title: &str,
) -> Result<AnalysisReport, CompletionError> {
    let key = fingerprint(content, title);
    if let Some(hit) = cache.get(&key) {
        debug!(key = %&key[..12], "analysis cache hit");
        return Ok(hit);
    }

    let raw = client.complete(title, content).await?;
    debug!(
        key = %&key[..12],
        provider = client.provider_name(),
        reply_len = raw.len(),
        "completion received"
    );

    let snapshot = lexicon.snapshot();
    let report = parser::parse_report(&raw, snapshot.as_deref());
    cache.insert(&key, report.clone());
    Ok(report)
}
