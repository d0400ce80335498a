//! Prefix index error types
//!
//! Error codes:
//! - CSVINDEX_INDEX_OPEN_FAILED
//! - CSVINDEX_INDEX_READ_FAILED
//! - CSVINDEX_INDEX_INVALID_PREFIX_LENGTH
//!
//! Malformed rows are not errors; they are skipped and counted.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while building a prefix index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to open index csv {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read index csv {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("prefix length must be at least 1, got {0}")]
    InvalidPrefixLength(usize),
}

impl IndexError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::Open { .. } => "CSVINDEX_INDEX_OPEN_FAILED",
            IndexError::Read { .. } => "CSVINDEX_INDEX_READ_FAILED",
            IndexError::InvalidPrefixLength(_) => "CSVINDEX_INDEX_INVALID_PREFIX_LENGTH",
        }
    }
}
