//! Service configuration
//!
//! Defaults, then an optional TOML file named by `TRACKER_CONFIG`, then
//! individual environment overrides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};
use crate::locale::Locale;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub insights: InsightsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file for the persisted caches; `None` keeps them in memory
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub default_locale: Locale,
    pub processing_time_ttl_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `tracker_insights=debug`
    pub filter: String,
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: Some(PathBuf::from("tracker-insights.db")),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::English,
            processing_time_ttl_hours: 24,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "tracker_insights=info,tower_http=info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("TRACKER_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| InsightError::Config(format!("invalid config: {}", e)))
    }

    /// Apply `TRACKER_*` overrides from the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("TRACKER_BIND") {
            self.server.bind = bind
                .parse()
                .map_err(|e| InsightError::Config(format!("invalid TRACKER_BIND '{}': {}", bind, e)))?;
        }
        if let Some(path) = lookup("TRACKER_DB_PATH") {
            self.storage.db_path = match path.trim() {
                "" | ":memory:" => None,
                p => Some(PathBuf::from(p)),
            };
        }
        if let Some(filter) = lookup("TRACKER_LOG") {
            self.logging.filter = filter;
        }
        if let Some(locale) = lookup("TRACKER_LOCALE") {
            self.insights.default_locale = Locale::from_tag(&locale);
        }
        Ok(())
    }

    /// Negative values read as zero; values past chrono's range are rejected.
    pub fn processing_time_ttl(&self) -> Result<chrono::Duration> {
        let hours = self.insights.processing_time_ttl_hours.max(0);
        chrono::Duration::try_hours(hours).ok_or_else(|| {
            InsightError::Config(format!("processing_time_ttl_hours out of range: {}", hours))
        })
    }
}
