//! Prefix index subsystem
//!
//! The index is derived state produced by an external build step. It is
//! read once at construction and never written.
//!
//! # Invariants
//!
//! - Every offset points at byte 0 or at the start of a data record
//! - Rows sharing a prefix are contiguous from the indexed offset
//!   (precondition on the data file, not checked here)
//! - Immutable after construction

mod errors;
mod prefix;

pub use errors::{IndexError, IndexResult};
pub use prefix::{prefix_of, LoadStats, PrefixIndex};
