//! Lookup engine subsystem
//!
//! Point lookups (`get_row`) and case-insensitive substring lookups
//! (`get_rows_by_partial_key`) over a data CSV, bounded to the
//! same-prefix region the prefix index points at.
//!
//! # Preconditions on the input files
//!
//! - Rows sharing a prefix are contiguous in the data file from the
//!   indexed offset; the engine does not check this
//! - Both files are immutable for the engine's lifetime

mod config;
mod engine;
mod errors;
mod scan;

pub use config::EngineConfig;
pub use engine::LookupEngine;
pub use errors::{LookupError, LookupResult};
pub use scan::Row;
