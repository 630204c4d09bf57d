//! Error types for likert-core

use thiserror::Error;

/// Main error type for the likert-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected user input: blank or duplicate metric name, no metric
    /// selected, no metrics defined, unknown period.
    #[error("{0}")]
    Validation(String),

    /// Record position outside the current log
    #[error("record index {index} out of range (log has {len} records)")]
    Index { index: usize, len: usize },

    /// Malformed CSV input
    #[error("import error on line {line}: {message}")]
    ImportFormat { line: usize, message: String },

    /// Key-value store error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// True for errors caused by user input rather than the environment.
    ///
    /// The store is guaranteed unchanged after one of these.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Index { .. } | Error::ImportFormat { .. }
        )
    }
}

/// Result type alias for likert-core
pub type Result<T> = std::result::Result<T, Error>;
