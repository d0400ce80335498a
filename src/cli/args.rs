//! CLI argument definitions using clap
//!
//! Commands:
//! - csvindex get --config <path> <KEY>
//! - csvindex search --config <path> <SUBSTRING> [--limit N]
//! - csvindex batch --config <path>
//! - csvindex warmup --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// csvindex - prefix-indexed lookups over large CSV files
#[derive(Parser, Debug)]
#[command(name = "csvindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up the row whose key matches exactly
    Get {
        /// Path to configuration file
        #[arg(long, default_value = "./csvindex.json")]
        config: PathBuf,

        /// Full lookup key
        key: String,
    },

    /// Find rows whose key contains a substring, ignoring case
    Search {
        /// Path to configuration file
        #[arg(long, default_value = "./csvindex.json")]
        config: PathBuf,

        /// Substring; its leading characters select the prefix region
        substring: String,

        /// Maximum rows to return, -1 for no limit
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Answer JSON requests read line by line from stdin
    Batch {
        /// Path to configuration file
        #[arg(long, default_value = "./csvindex.json")]
        config: PathBuf,
    },

    /// Pre-open the configured number of handles and report pool state
    Warmup {
        /// Path to configuration file
        #[arg(long, default_value = "./csvindex.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
