//! Lookup engine
//!
//! Owns the prefix index and the handle pool. A lookup derives the key's
//! prefix, resolves it to a byte offset, checks out a handle, seeks, and
//! scans forward through the same-prefix region. The handle goes back to
//! the pool on every exit path.
//!
//! All calls are synchronous and may be made from any number of threads.

use std::io::{Seek, SeekFrom};
use std::sync::Arc;

use crate::index::{prefix_of, PrefixIndex};
use crate::observability::{log_event_with_fields, Event, Logger, LookupMetrics, MetricsSnapshot};
use crate::pool::{DataFileSource, HandlePool, Pool};

use super::config::EngineConfig;
use super::errors::{LookupError, LookupResult};
use super::scan::{self, Row};

/// Read-only lookup layer over a data CSV and its prefix index
pub struct LookupEngine {
    config: EngineConfig,
    index: PrefixIndex,
    pool: HandlePool,
    metrics: Arc<LookupMetrics>,
}

impl LookupEngine {
    /// Opens the engine.
    ///
    /// Fails if the configuration is invalid, if either file is missing, or
    /// if the index file cannot be read. The data file is not opened here;
    /// handles are opened lazily (or by warm-up when `warm_up_on_open`).
    pub fn open(config: EngineConfig) -> LookupResult<Self> {
        Self::open_inner(config).map_err(|e| {
            let reason = e.to_string();
            log_event_with_fields(
                Event::EngineOpenFailed,
                &[("code", e.code()), ("reason", reason.as_str())],
            );
            e
        })
    }

    fn open_inner(config: EngineConfig) -> LookupResult<Self> {
        config.validate()?;

        if !config.data_csv_path.exists() {
            return Err(LookupError::DataFileMissing(config.data_csv_path.clone()));
        }
        if !config.index_csv_path.exists() {
            return Err(LookupError::IndexFileMissing(config.index_csv_path.clone()));
        }

        let index = PrefixIndex::build(&config.index_csv_path, config.index_key_length)?;

        let metrics = Arc::new(LookupMetrics::new());
        let stats = index.load_stats();
        metrics.record_index_load(stats.loaded, stats.skipped);

        let pool = Pool::with_metrics(
            DataFileSource::new(&config.data_csv_path),
            config.concurrent_handle_limit,
            Arc::clone(&metrics),
        );

        let engine = Self {
            config,
            index,
            pool,
            metrics,
        };

        let prefixes = engine.index.len().to_string();
        let limit = engine.pool.limit().to_string();
        let prefix_length = engine.index.prefix_length().to_string();
        log_event_with_fields(
            Event::EngineOpen,
            &[
                ("handle_limit", limit.as_str()),
                ("prefix_length", prefix_length.as_str()),
                ("prefixes", prefixes.as_str()),
            ],
        );

        if engine.config.warm_up_on_open {
            engine.warm_up()?;
        }

        Ok(engine)
    }

    /// Returns the row whose first field equals `key`, or `None`.
    ///
    /// Fails without I/O when `key` is shorter than the prefix length.
    pub fn get_row(&self, key: &str) -> LookupResult<Option<Row>> {
        self.metrics.increment_exact_lookups();

        let result = self.exact(key);
        match &result {
            Ok(Some(_)) => self.metrics.add_rows_returned(1),
            Ok(None) => self.metrics.increment_not_found(),
            Err(e) => self.log_failure("exact", key, e),
        }
        result
    }

    fn exact(&self, key: &str) -> LookupResult<Option<Row>> {
        let prefix = self.key_prefix(key)?;

        let Some(offset) = self.index.resolve(prefix) else {
            return Ok(None);
        };

        let mut handle = self.pool.acquire()?;
        handle
            .seek(SeekFrom::Start(offset))
            .map_err(|source| LookupError::Seek { offset, source })?;

        let (row, scanned) = scan::find_exact(&mut *handle, key, prefix, self.index.prefix_length())?;
        self.metrics.add_records_scanned(scanned);

        if Logger::enabled(Event::LookupExact.severity()) {
            let offset_str = offset.to_string();
            let scanned_str = scanned.to_string();
            log_event_with_fields(
                Event::LookupExact,
                &[
                    ("found", if row.is_some() { "true" } else { "false" }),
                    ("key", key),
                    ("offset", offset_str.as_str()),
                    ("scanned", scanned_str.as_str()),
                ],
            );
        }

        Ok(row)
    }

    /// Returns rows whose first field contains `partial`, ignoring case,
    /// in file order, at most `limit` of them (`None` for no limit).
    ///
    /// The first prefix-length characters of `partial` select the regions
    /// to scan: every indexed prefix equal to them ignoring case.
    pub fn get_rows_by_partial_key(
        &self,
        partial: &str,
        limit: Option<usize>,
    ) -> LookupResult<Vec<Row>> {
        self.metrics.increment_partial_lookups();

        let result = self.partial(partial, limit);
        match &result {
            Ok(rows) if rows.is_empty() => self.metrics.increment_not_found(),
            Ok(rows) => self.metrics.add_rows_returned(rows.len() as u64),
            Err(e) => self.log_failure("partial", partial, e),
        }
        result
    }

    fn partial(&self, partial: &str, limit: Option<usize>) -> LookupResult<Vec<Row>> {
        let prefix = self.key_prefix(partial)?;
        let mut rows = Vec::new();

        if limit == Some(0) {
            return Ok(rows);
        }

        let regions: Vec<(&str, u64)> = self.index.resolve_ignore_case(prefix).collect();
        if regions.is_empty() {
            return Ok(rows);
        }

        let needle = partial.to_lowercase();
        let prefix_length = self.index.prefix_length();
        let mut handle = self.pool.acquire()?;
        let mut scanned = 0;

        for (region_prefix, offset) in &regions {
            handle
                .seek(SeekFrom::Start(*offset))
                .map_err(|source| LookupError::Seek {
                    offset: *offset,
                    source,
                })?;
            scanned += scan::collect_partial(
                &mut *handle,
                &needle,
                region_prefix,
                prefix_length,
                limit,
                &mut rows,
            )?;
            if limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
        }
        self.metrics.add_records_scanned(scanned);

        if Logger::enabled(Event::LookupPartial.severity()) {
            let matched = rows.len().to_string();
            let region_count = regions.len().to_string();
            let scanned_str = scanned.to_string();
            log_event_with_fields(
                Event::LookupPartial,
                &[
                    ("key", partial),
                    ("matched", matched.as_str()),
                    ("regions", region_count.as_str()),
                    ("scanned", scanned_str.as_str()),
                ],
            );
        }

        Ok(rows)
    }

    /// Pre-opens `warm_up_count` handles, `warm_up_delay_ms` apart, and
    /// leaves them idle in the pool.
    pub fn warm_up(&self) -> LookupResult<()> {
        self.pool
            .warm_up(self.config.warm_up_count, self.config.warm_up_delay())?;
        Ok(())
    }

    fn key_prefix<'k>(&self, key: &'k str) -> LookupResult<&'k str> {
        let required = self.index.prefix_length();
        prefix_of(key, required).ok_or_else(|| LookupError::KeyTooShort {
            len: key.chars().count(),
            required,
        })
    }

    fn log_failure(&self, mode: &str, key: &str, e: &LookupError) {
        // Admission rejections are already logged by the pool
        if e.is_retryable() {
            return;
        }
        let reason = e.to_string();
        log_event_with_fields(
            Event::LookupFailed,
            &[
                ("code", e.code()),
                ("key", key),
                ("mode", mode),
                ("reason", reason.as_str()),
            ],
        );
    }

    /// Characters in every indexed prefix
    pub fn prefix_length(&self) -> usize {
        self.index.prefix_length()
    }

    /// The loaded prefix index
    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    /// The handle pool
    pub fn pool(&self) -> &HandlePool {
        &self.pool
    }

    /// The configuration the engine was opened with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
