//! Change detection over the dashboard application list.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::ApplicationSummary;
use crate::store::KeyValueStore;

const FINGERPRINT_KEY: &str = "last_fingerprint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchOutcome {
    FirstSeen,
    Unchanged,
    Changed,
}

pub struct StatusWatch {
    store: Arc<dyn KeyValueStore>,
}

impl StatusWatch {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Compare the list against the last one seen and remember it.
    /// An empty list tells us nothing and is ignored.
    pub fn observe(&self, apps: &[ApplicationSummary]) -> Result<WatchOutcome> {
        if apps.is_empty() {
            return Ok(WatchOutcome::Unchanged);
        }

        let current = fingerprint(apps)?;
        let previous = self.store.get(FINGERPRINT_KEY)?;

        let outcome = match previous {
            None => WatchOutcome::FirstSeen,
            Some(prev) if prev == current => WatchOutcome::Unchanged,
            Some(_) => WatchOutcome::Changed,
        };

        if outcome != WatchOutcome::Unchanged {
            if let Err(e) = self.store.put(FINGERPRINT_KEY, &current) {
                warn!(error = %e, "failed to store application fingerprint");
            }
        }
        if outcome == WatchOutcome::Changed {
            info!(applications = apps.len(), "application status change detected");
        }

        Ok(outcome)
    }
}

/// blake3 over the JSON form of the list
pub fn fingerprint(apps: &[ApplicationSummary]) -> Result<String> {
    let bytes = serde_json::to_vec(apps)?;
    Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
}
