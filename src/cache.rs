// src/cache.rs
//! Content-addressed memo of analysis reports: SHA-256 fingerprint of
//! content+title, 48-hour TTL checked lazily on read, 2000-entry cap with
//! oldest-insertion eviction (insertion order, not LRU-by-access).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::report::AnalysisReport;

pub const CACHE_TTL_MS: i64 = 48 * 3600 * 1000;
pub const CACHE_MAX_ENTRIES: usize = 2000;

/// Hex SHA-256 of the UTF-8 concatenation of content and title.
pub fn fingerprint(content: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

#[derive(Debug, Clone)]
struct CacheEntry {
    inserted_at_ms: i64,
    report: AnalysisReport,
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

/// Mutex-guarded bounded store. Last-writer-wins under concurrency; duplicate
/// upstream calls for the same fingerprint are accepted rather than
/// serialized per key.
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    ttl_ms: i64,
    max_entries: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_limits(CACHE_TTL_MS, CACHE_MAX_ENTRIES)
    }

    pub fn with_limits(ttl_ms: i64, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            ttl_ms,
            max_entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<AnalysisReport> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    pub fn insert(&self, key: &str, report: AnalysisReport) {
        self.insert_at(key, report, Utc::now().timestamp_millis());
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh iff `now - inserted < ttl`; an entry read at exactly the TTL
    /// boundary is expired. Expired entries are removed on read.
    fn get_at(&self, key: &str, now_ms: i64) -> Option<AnalysisReport> {
        let mut g = self.inner.lock().ok()?;
        let expired = match g.map.get(key) {
            Some(entry) if now_ms - entry.inserted_at_ms < self.ttl_ms => {
                return Some(entry.report.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            g.map.remove(key);
        }
        None
    }

    fn insert_at(&self, key: &str, report: AnalysisReport, now_ms: i64) {
        let Ok(mut g) = self.inner.lock() else {
            return;
        };
        let entry = CacheEntry {
            inserted_at_ms: now_ms,
            report,
        };
        // Re-inserting an existing key keeps its original queue position,
        // matching insertion-order (not recency) eviction.
        if g.map.insert(key.to_string(), entry).is_none() {
            g.order.push_back(key.to_string());
        }
        while g.map.len() > self.max_entries {
            match g.order.pop_front() {
                // The popped slot may belong to an entry already expired away.
                Some(oldest) => {
                    g.map.remove(&oldest);
                }
                None => break,
            }
        }
    }
}
