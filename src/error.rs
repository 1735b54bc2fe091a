//! Error types for the storage, config and server edges.
//!
//! The interpretation components never return these; they degrade to
//! absent values instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InsightError>;

impl InsightError {
    /// Stable label for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            InsightError::Storage(_) => "storage",
            InsightError::Serialization(_) => "serialization",
            InsightError::Config(_) => "config",
            InsightError::Io(_) => "io",
        }
    }
}
