//! Handle pool subsystem
//!
//! A bounded, reusable set of read handles onto the data file with an
//! admission gate on how many may be checked out at once.
//!
//! # Invariants
//!
//! - `outstanding() <= limit()` at all times
//! - A failed open never consumes an admission slot
//! - Every successful acquisition is released exactly once (RAII guard)

mod errors;
mod handle_pool;

pub use errors::{PoolError, PoolResult};
pub use handle_pool::{DataFileSource, HandlePool, Pool, Pooled, ResourceSource};
