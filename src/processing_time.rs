//! Estimated processing time (in months) per line of business.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::KeyValueStore;

pub const DEFAULT_MONTHS: u32 = 12;

/// Exact program names and API codes, matched case-insensitively
const STATIC_TIMES: &[(&str, u32)] = &[
    // Permanent residence
    ("Spouse", 12),
    ("Common-law", 12),
    ("Partner", 12),
    ("Sponsorship", 12),
    ("Express Entry", 6),
    ("Canadian Experience Class", 5),
    ("Federal Skilled Worker", 6),
    ("Provincial Nominee", 8),
    ("Parents", 24),
    ("Grandparents", 24),
    ("Citizenship", 7),
    ("Card", 2),
    // Codes as sent by the API
    ("SW1-FED", 6),
    ("CEC", 5),
    ("FST", 6),
    ("PNP", 8),
    ("FC1", 12),
    ("V-TR", 5),
    // Temporary residence
    ("Visitor", 5),
    ("Study", 3),
    ("Work", 4),
    ("Extension", 4),
    ("Visa", 1),
];

/// Keyword containment rules, checked in order. Longer-running categories
/// come first so a broad term cannot shadow them.
const KEYWORD_RULES: &[(&[&str], u32)] = &[
    (&["PARENTS", "GRANDPARENTS"], 24),
    (&["SPOUSE", "COMMON-LAW", "SPONSORSHIP", "FC1"], 12),
    (&["EXPRESS ENTRY", "SKILLED WORKER", "SW1", "FST"], 6),
    (&["CANADIAN EXPERIENCE", "CEC"], 5),
    (&["CITIZENSHIP"], 7),
    (&["VISITOR", "V-TR"], 5),
    (&["STUDY", "STUDENT"], 3),
    (&["WORK"], 4),
];

/// Offline estimator over the static tables
#[derive(Debug, Clone, Default)]
pub struct ProcessingTimeEstimator;

impl ProcessingTimeEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate(&self, lob: Option<&str>) -> u32 {
        let key = match normalize(lob) {
            Some(key) => key,
            None => return DEFAULT_MONTHS,
        };

        if let Some(&(_, months)) = STATIC_TIMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
        {
            return months;
        }

        KEYWORD_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| key.contains(k)))
            .map(|&(_, months)| months)
            .unwrap_or(DEFAULT_MONTHS)
    }
}

/// Trimmed, uppercased LOB; `None` when blank
fn normalize(lob: Option<&str>) -> Option<String> {
    lob.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

/// Remote provider of processing-time estimates
#[async_trait]
pub trait EstimateSource: Send + Sync {
    async fn fetch_months(&self, lob: &str) -> Option<u32>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedEstimate {
    months: u32,
    fetched_at: DateTime<Utc>,
}

/// Static estimator plus an optional remote source with a time-bounded cache
pub struct ProcessingTimeService {
    estimator: ProcessingTimeEstimator,
    store: Arc<dyn KeyValueStore>,
    remote: Option<Arc<dyn EstimateSource>>,
    ttl: Duration,
}

impl ProcessingTimeService {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self {
            estimator: ProcessingTimeEstimator::new(),
            store,
            remote: None,
            ttl,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn EstimateSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub async fn estimate(&self, lob: Option<&str>) -> u32 {
        self.estimate_at(lob, Utc::now()).await
    }

    pub async fn estimate_at(&self, lob: Option<&str>, now: DateTime<Utc>) -> u32 {
        let key = match normalize(lob) {
            Some(key) => key,
            None => return DEFAULT_MONTHS,
        };

        let remote = match &self.remote {
            Some(remote) => remote,
            None => return self.estimator.estimate(Some(&key)),
        };

        if let Some(months) = self.cached(&key, now) {
            debug!(lob = %key, months, "processing time served from cache");
            return months;
        }

        match remote.fetch_months(&key).await {
            Some(months) if months > 0 => {
                self.remember(&key, months, now);
                months
            }
            _ => {
                let months = self.estimator.estimate(Some(&key));
                debug!(lob = %key, months, "remote estimate unavailable, using static table");
                months
            }
        }
    }

    fn cached(&self, key: &str, now: DateTime<Utc>) -> Option<u32> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, lob = key, "processing time cache read failed");
                return None;
            }
        };

        let entry: CachedEstimate = serde_json::from_str(&raw).ok()?;
        (now - entry.fetched_at < self.ttl).then_some(entry.months)
    }

    fn remember(&self, key: &str, months: u32, now: DateTime<Utc>) {
        let entry = CachedEstimate {
            months,
            fetched_at: now,
        };
        let result = serde_json::to_string(&entry)
            .map_err(crate::error::InsightError::from)
            .and_then(|raw| self.store.put(key, &raw));
        if let Err(e) = result {
            warn!(error = %e, lob = key, "failed to cache processing time");
        }
    }
}
