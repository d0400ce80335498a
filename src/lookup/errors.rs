//! Lookup engine error types
//!
//! Error taxonomy:
//! - Configuration (construction): missing files, invalid settings, unreadable index
//! - Admission: handle limit reached (retryable)
//! - Resource: handle could not be opened
//! - Input validation: key shorter than the index prefix
//! - I/O: seek or read failures while scanning, propagated with their source
//!
//! "Not found" is not an error: lookups return `None` or an empty list.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::index::IndexError;
use crate::pool::PoolError;

/// Result type for lookup operations
pub type LookupResult<T> = Result<T, LookupError>;

/// Errors raised by the lookup engine
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("data csv file does not exist: {}", .0.display())]
    DataFileMissing(PathBuf),

    #[error("index csv file does not exist: {}", .0.display())]
    IndexFileMissing(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("provided key too short for index: {len} characters, need {required}")]
    KeyTooShort { len: usize, required: usize },

    #[error("failed to seek data csv to offset {offset}: {source}")]
    Seek {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to read data csv: {0}")]
    Read(#[from] csv::Error),
}

impl LookupError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::DataFileMissing(_) => "CSVINDEX_DATA_FILE_MISSING",
            LookupError::IndexFileMissing(_) => "CSVINDEX_INDEX_FILE_MISSING",
            LookupError::InvalidConfig(_) => "CSVINDEX_INVALID_CONFIG",
            LookupError::Index(e) => e.code(),
            LookupError::Pool(e) => e.code(),
            LookupError::KeyTooShort { .. } => "CSVINDEX_KEY_TOO_SHORT",
            LookupError::Seek { .. } => "CSVINDEX_SEEK_FAILED",
            LookupError::Read(_) => "CSVINDEX_READ_FAILED",
        }
    }

    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Pool(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether the error came from engine construction
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LookupError::DataFileMissing(_)
                | LookupError::IndexFileMissing(_)
                | LookupError::InvalidConfig(_)
                | LookupError::Index(_)
        )
    }
}
