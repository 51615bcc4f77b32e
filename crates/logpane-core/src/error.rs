use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Index query against the entry store (or the visible subset) failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("index {index} out of range for {len} entries")]
    OutOfRange { index: usize, len: usize },
}

/// Filter pattern could not be applied; the previous view stays active
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl FilterError {
    /// The rejected pattern
    pub fn pattern(&self) -> &str {
        match self {
            Self::InvalidPattern { pattern, .. } => pattern,
        }
    }
}

/// A raw record could not be turned into an entry. Never reaches producers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("malformed record preamble: {preamble:?}")]
    MalformedRecord { preamble: String },
}

/// Style edit rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("style edit needs a logger name")]
    EmptyLoggerName,
}

/// Filter history persistence failed
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse history file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] toml::ser::Error),
}
