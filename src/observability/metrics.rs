//! Lookup metrics for csvindex
//!
//! - Counters only, monotonic
//! - Reset only when the engine is rebuilt
//! - Relaxed atomics: counters are observational, never used for control

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of operational counters owned by one engine
#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Exact-match lookups attempted
    exact_lookups: AtomicU64,
    /// Partial-match lookups attempted
    partial_lookups: AtomicU64,
    /// Rows handed back to callers
    rows_returned: AtomicU64,
    /// Lookups that completed with no result
    not_found: AtomicU64,
    /// Data-file records read during region scans
    records_scanned: AtomicU64,
    /// Acquisitions rejected by admission control
    admission_rejections: AtomicU64,
    /// Failures to open a new handle
    handle_open_failures: AtomicU64,
    /// Handles opened onto the data file
    handles_opened: AtomicU64,
    /// Acquisitions served from the idle cache
    handles_reused: AtomicU64,
    /// Index rows loaded at construction
    index_rows_loaded: AtomicU64,
    /// Index rows dropped as malformed at construction
    index_rows_skipped: AtomicU64,
}

impl LookupMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_exact_lookups(&self) {
        self.exact_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_partial_lookups(&self) {
        self.partial_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_scanned(&self, records: u64) {
        self.records_scanned.fetch_add(records, Ordering::Relaxed);
    }

    pub fn increment_admission_rejections(&self) {
        self.admission_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_handle_open_failures(&self) {
        self.handle_open_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_handles_opened(&self) {
        self.handles_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_handles_reused(&self) {
        self.handles_reused.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of an index load
    pub fn record_index_load(&self, loaded: u64, skipped: u64) {
        self.index_rows_loaded.fetch_add(loaded, Ordering::Relaxed);
        self.index_rows_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Handles opened so far
    pub fn handles_opened(&self) -> u64 {
        self.handles_opened.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            exact_lookups: self.exact_lookups.load(Ordering::Relaxed),
            partial_lookups: self.partial_lookups.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            records_scanned: self.records_scanned.load(Ordering::Relaxed),
            admission_rejections: self.admission_rejections.load(Ordering::Relaxed),
            handle_open_failures: self.handle_open_failures.load(Ordering::Relaxed),
            handles_opened: self.handles_opened.load(Ordering::Relaxed),
            handles_reused: self.handles_reused.load(Ordering::Relaxed),
            index_rows_loaded: self.index_rows_loaded.load(Ordering::Relaxed),
            index_rows_skipped: self.index_rows_skipped.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub exact_lookups: u64,
    pub partial_lookups: u64,
    pub rows_returned: u64,
    pub not_found: u64,
    pub records_scanned: u64,
    pub admission_rejections: u64,
    pub handle_open_failures: u64,
    pub handles_opened: u64,
    pub handles_reused: u64,
    pub index_rows_loaded: u64,
    pub index_rows_skipped: u64,
}

impl MetricsSnapshot {
    /// Render as a compact JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
