//! csvindex - prefix-indexed point and substring lookups over large CSV files
//!
//! A small index CSV maps fixed-length key prefixes to byte offsets in a
//! large data CSV. Lookups seek to the offset and scan only the
//! same-prefix region, sharing a bounded pool of open file handles.
//!
//! ```ignore
//! use csvindex::lookup::{EngineConfig, LookupEngine};
//!
//! let engine = LookupEngine::open(EngineConfig::new("rows.csv", "index.csv", 3))?;
//! let row = engine.get_row("abc123")?;
//! let rows = engine.get_rows_by_partial_key("ABC1", Some(10))?;
//! ```

pub mod cli;
pub mod index;
pub mod lookup;
pub mod observability;
pub mod pool;
