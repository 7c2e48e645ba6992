// src/lexicon.rs
//! Sentiment lexicon store: word -> {intensity, polarity}, loaded once from a
//! JSON resource. The load is asynchronous and best-effort; every consumer has
//! a defined zero-lexicon behavior, so a failed load degrades output instead
//! of blocking the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

pub const DEFAULT_LEXICON_PATH: &str = "assets/en_emotion_dict.json";
pub const ENV_LEXICON_PATH: &str = "FACTLENS_LEXICON_PATH";

/// Categorical sentiment direction of a lexicon word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// One row of the bundled dictionary. Keys are lowercased on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub word: String,
    pub intensity: f64,
    pub polarity: Polarity,
}

/// Read-only word map built from the dictionary resource.
#[derive(Debug, Default)]
pub struct SentimentLexicon {
    entries: HashMap<String, LexiconEntry>,
}

impl SentimentLexicon {
    /// Build from raw entries; duplicate words keep the first occurrence.
    pub fn from_entries(entries: Vec<LexiconEntry>) -> Self {
        let mut map = HashMap::with_capacity(entries.len());
        for e in entries {
            map.entry(e.word.to_lowercase()).or_insert(e);
        }
        Self { entries: map }
    }

    pub fn lookup(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positive- and negative-polarity word lists, recomputed on demand.
    /// The dictionary is small, an O(n) scan is fine.
    pub fn polarity_partition(&self) -> (Vec<String>, Vec<String>) {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for e in self.entries.values() {
            match e.polarity {
                Polarity::Positive => positive.push(e.word.to_lowercase()),
                Polarity::Negative => negative.push(e.word.to_lowercase()),
                Polarity::Neutral => {}
            }
        }
        (positive, negative)
    }

    /// Count positive/negative lexicon occurrences among `tokens`.
    pub fn polarity_counts<S: AsRef<str>>(&self, tokens: &[S]) -> (usize, usize) {
        let mut pos = 0usize;
        let mut neg = 0usize;
        for t in tokens {
            if let Some(e) = self.entries.get(t.as_ref()) {
                match e.polarity {
                    Polarity::Positive => pos += 1,
                    Polarity::Negative => neg += 1,
                    Polarity::Neutral => {}
                }
            }
        }
        (pos, neg)
    }
}

/// Word tokenizer shared by the detector, scorer, and extractor:
/// alphanumeric + apostrophe runs, lowercased.
pub fn tokenize(text: &str) -> Vec<String> {
    static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w']+").expect("token regex"));
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Shared handle around the lexicon with a readiness flag. Cloneable and
/// cheap; request handlers take a snapshot and never wait for the load.
#[derive(Clone, Default)]
pub struct LexiconStore {
    inner: Arc<RwLock<Option<Arc<SentimentLexicon>>>>,
}

impl LexiconStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built for tests and fixtures.
    pub fn with_lexicon(lexicon: SentimentLexicon) -> Self {
        let store = Self::new();
        store.install(lexicon);
        store
    }

    pub fn loaded(&self) -> bool {
        self.inner.read().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Current lexicon, if the load has completed.
    pub fn snapshot(&self) -> Option<Arc<SentimentLexicon>> {
        self.inner.read().ok().and_then(|g| g.clone())
    }

    pub fn install(&self, lexicon: SentimentLexicon) {
        if let Ok(mut g) = self.inner.write() {
            *g = Some(Arc::new(lexicon));
        }
    }

    /// Read and parse the dictionary file. Errors are returned for logging
    /// but leave the store empty; downstream components keep working with
    /// neutral defaults.
    pub async fn load_from_path(&self, path: &Path) -> anyhow::Result<usize> {
        let raw = tokio::fs::read_to_string(path).await?;
        let entries: Vec<LexiconEntry> = serde_json::from_str(&raw)?;
        let lexicon = SentimentLexicon::from_entries(entries);
        let n = lexicon.len();
        self.install(lexicon);
        Ok(n)
    }

    /// Resolve the dictionary path (env override, then default) and load it
    /// in the background. Never blocks request handling.
    pub fn spawn_background_load(&self) {
        let store = self.clone();
        let path = std::env::var(ENV_LEXICON_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEXICON_PATH));
        tokio::spawn(async move {
            match store.load_from_path(&path).await {
                Ok(n) => info!(entries = n, path = %path.display(), "sentiment lexicon loaded"),
                Err(e) => warn!(error = %e, path = %path.display(), "lexicon load failed; running with neutral defaults"),
            }
        });
    }
}
