//! CLI module for csvindex
//!
//! Provides command-line access to:
//! - get: one exact lookup
//! - search: one partial lookup
//! - batch: JSON requests from stdin
//! - warmup: pre-open handles and report pool state

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    batch, get, open_engine, run, run_batch, run_command, search, warmup, BatchRequest,
    BatchSummary,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response};
