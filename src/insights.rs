//! Per-event-key explanation cache.
//!
//! Resolved explanations are written through to the backing store as soon
//! as they are found and never expire. Keys that cannot be resolved are not
//! remembered, so the next batch tries them again.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, warn};

use crate::dictionary::ExplanationSource;
use crate::store::KeyValueStore;

static CATEGORY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Medical|Status|Background|Eligibility):\s*").expect("valid regex")
});
static IMM_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)IMM\s*(\d{4,5})").expect("valid regex"));

pub struct InsightCache {
    store: Arc<dyn KeyValueStore>,
    /// Serializes check-resolve-write
    lock: Mutex<()>,
}

impl InsightCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| is_usable(v)),
            Err(e) => {
                warn!(error = %e, key, "insight cache read failed");
                None
            }
        }
    }

    /// Best effort; a failed write is logged and dropped.
    pub fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.store.put(key, value) {
            warn!(error = %e, key, "insight cache write failed");
        }
    }

    /// Explanations for every key that is cached or resolvable through
    /// `source`. Unresolvable keys are left out of the result.
    pub fn resolve_all<'a, I>(&self, keys: I, source: &dyn ExplanationSource) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let _guard = self.lock.lock();
        let mut resolved = BTreeMap::new();
        let mut missing = Vec::new();

        for key in keys {
            if resolved.contains_key(key) {
                continue;
            }
            match self.get(key) {
                Some(cached) => {
                    resolved.insert(key.to_string(), cached);
                }
                None if !missing.contains(&key) => missing.push(key),
                None => {}
            }
        }

        if missing.is_empty() {
            return resolved;
        }

        for key in missing {
            match resolve_key(key, source) {
                Some(explanation) => {
                    debug!(key, "explanation found in dictionary");
                    self.put(key, &explanation);
                    resolved.insert(key.to_string(), explanation);
                }
                None => warn!(key, "no explanation for event key"),
            }
        }

        resolved
    }

    /// Explicit user reset
    pub fn clear(&self) {
        let _guard = self.lock.lock();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear insight cache");
        }
    }
}

/// Cleaned key, raw key, then the embedded IMM form number.
pub fn resolve_key(key: &str, source: &dyn ExplanationSource) -> Option<String> {
    let cleaned = CATEGORY_PREFIX.replace(key, "");

    source
        .explain(&cleaned)
        .or_else(|| source.explain(key))
        .or_else(|| {
            IMM_NUMBER
                .captures(key)
                .and_then(|caps| caps.get(1))
                .and_then(|number| source.explain(number.as_str()))
        })
}

fn is_usable(value: &str) -> bool {
    !value.trim().is_empty() && value != "null"
}
