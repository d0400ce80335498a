//! Handle pool error types
//!
//! Error codes:
//! - CSVINDEX_TOO_MANY_CONCURRENT_HANDLES (retryable)
//! - CSVINDEX_INVALID_HANDLE

use std::io;

use thiserror::Error;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors raised while acquiring pooled handles
#[derive(Debug, Error)]
pub enum PoolError {
    /// Admission control rejected the acquisition. No state was changed.
    #[error("too many concurrent handles: limit {limit} reached")]
    TooManyConcurrentHandles { limit: usize },

    /// A fresh handle could not be opened.
    #[error("invalid handle: failed to open {resource}: {source}")]
    InvalidHandle {
        resource: String,
        #[source]
        source: io::Error,
    },
}

impl PoolError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PoolError::TooManyConcurrentHandles { .. } => "CSVINDEX_TOO_MANY_CONCURRENT_HANDLES",
            PoolError::InvalidHandle { .. } => "CSVINDEX_INVALID_HANDLE",
        }
    }

    /// Whether the caller may retry later with a chance of success
    pub fn is_retryable(&self) -> bool {
        matches!(self, PoolError::TooManyConcurrentHandles { .. })
    }
}
