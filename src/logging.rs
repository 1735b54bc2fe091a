use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{InsightError, Result};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| InsightError::Config(format!("Failed to create log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init()
    };

    result.map_err(|e| InsightError::Config(format!("Failed to install subscriber: {}", e)))
}
