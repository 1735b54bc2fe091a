//! Status interpretation and forecasting for immigration application
//! tracking: explanations for opaque status codes, localized titles for
//! history keys, processing-time estimates, milestone derivation and
//! completion forecasts, with a persisted explanation cache.

pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod locale;
pub mod logging;
pub mod milestones;
pub mod models;
pub mod processing_time;
pub mod server;
pub mod store;
pub mod translator;
pub mod watch;


pub use dictionary::{ExplanationSource, StatusDictionary};
pub use engine::InsightEngine;
pub use error::{InsightError, Result};
pub use insights::InsightCache;
pub use locale::Locale;
pub use models::{ApplicationMilestones, ApplicationView, ForecastResult, HistoryEvent, MilestoneStatus};
pub use processing_time::{ProcessingTimeEstimator, ProcessingTimeService};
pub use translator::KeyTranslator;
