//! CLI command implementations
//!
//! Each command loads the configuration, applies its log level, opens the
//! engine, and writes JSON results to stdout. Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::lookup::{EngineConfig, LookupEngine};
use crate::observability::{log_event_with_fields, Event, Logger};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};

/// One batch request line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BatchRequest {
    /// Exact lookup
    Get { key: String },
    /// Partial lookup; `limit` -1 (the default) means no limit
    Search {
        key: String,
        #[serde(default = "unbounded")]
        limit: i64,
    },
}

fn unbounded() -> i64 {
    -1
}

/// Outcome counts for a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub requests: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Parse CLI args and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Get { config, key } => get(&config, &key),
        Command::Search {
            config,
            substring,
            limit,
        } => search(&config, &substring, limit),
        Command::Batch { config } => batch(&config),
        Command::Warmup { config } => warmup(&config),
    }
}

/// Load the configuration, apply its log level, and open the engine
pub fn open_engine(config_path: &Path) -> CliResult<LookupEngine> {
    let config = EngineConfig::load(config_path)?;
    Logger::set_min_severity(config.log_severity());
    Ok(LookupEngine::open(config)?)
}

/// Exact lookup of a single key
pub fn get(config_path: &Path, key: &str) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    let row = engine.get_row(key)?;
    write_response(&mut io::stdout(), json!(row))
}

/// Partial lookup of a single substring
pub fn search(config_path: &Path, substring: &str, limit: i64) -> CliResult<()> {
    let limit = parse_limit(limit)?;
    let engine = open_engine(config_path)?;
    let rows = engine.get_rows_by_partial_key(substring, limit)?;
    write_response(&mut io::stdout(), json!(rows))
}

/// Answer requests from stdin until EOF
pub fn batch(config_path: &Path) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_batch(&engine, stdin.lock(), &mut stdout)?;
    Ok(())
}

/// Open the engine, warm its pool, and report pool state
pub fn warmup(config_path: &Path) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    if !engine.config().warm_up_on_open {
        engine.warm_up()?;
    }

    let pool = engine.pool();
    write_response(
        &mut io::stdout(),
        json!({
            "idle": pool.idle_count(),
            "limit": pool.limit(),
            "opened": pool.opened_count(),
            "outstanding": pool.outstanding(),
        }),
    )
}

/// Process batch requests from `input`, one response line per request.
///
/// A failing request is answered with an error line; the batch goes on.
/// Only I/O failures on `output` end the run early.
pub fn run_batch<R: BufRead, W: Write>(
    engine: &LookupEngine,
    input: R,
    output: &mut W,
) -> CliResult<BatchSummary> {
    let mut summary = BatchSummary::default();

    for request in read_requests::<_, BatchRequest>(input) {
        summary.requests += 1;
        match request.and_then(|request| answer(engine, request)) {
            Ok(data) => {
                summary.succeeded += 1;
                write_response(output, data)?;
            }
            Err(e) => {
                summary.failed += 1;
                write_error(output, e.code().code(), e.message())?;
            }
        }
    }

    let requests = summary.requests.to_string();
    let failed = summary.failed.to_string();
    let metrics = engine.metrics().to_json();
    log_event_with_fields(
        Event::BatchComplete,
        &[
            ("failed", failed.as_str()),
            ("metrics", metrics.as_str()),
            ("requests", requests.as_str()),
        ],
    );

    Ok(summary)
}

fn answer(engine: &LookupEngine, request: BatchRequest) -> CliResult<Value> {
    match request {
        BatchRequest::Get { key } => Ok(json!(engine.get_row(&key)?)),
        BatchRequest::Search { key, limit } => {
            let limit = parse_limit(limit)?;
            Ok(json!(engine.get_rows_by_partial_key(&key, limit)?))
        }
    }
}

/// -1 means no limit; other negatives are rejected
fn parse_limit(limit: i64) -> CliResult<Option<usize>> {
    match limit {
        -1 => Ok(None),
        n if n >= 0 => Ok(Some(n as usize)),
        n => Err(CliError::invalid_argument(format!(
            "limit must be -1 or non-negative, got {}",
            n
        ))),
    }
}
