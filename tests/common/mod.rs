//! Shared fixtures for integration tests
//!
//! Builds a data CSV and a matching index CSV in a temp directory. The
//! generated index points each prefix at its first row, the way the
//! external build step would.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use csvindex::lookup::{EngineConfig, LookupEngine};
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub data_path: PathBuf,
    pub index_path: PathBuf,
}

impl Fixture {
    /// Data rows (one CSV line each, no newline) with a generated index
    pub fn new(rows: &[&str], prefix_length: usize) -> Self {
        let index = build_index(rows, prefix_length);
        Self::with_index(rows, &index)
    }

    /// Data rows with explicit index file contents
    pub fn with_index(rows: &[&str], index: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = dir.path().join("rows.csv");
        let index_path = dir.path().join("index.csv");

        let mut data = String::new();
        for row in rows {
            data.push_str(row);
            data.push('\n');
        }
        fs::write(&data_path, data).expect("Failed to write data csv");
        fs::write(&index_path, index).expect("Failed to write index csv");

        Self {
            dir,
            data_path,
            index_path,
        }
    }

    pub fn config(&self, prefix_length: usize) -> EngineConfig {
        EngineConfig::new(&self.data_path, &self.index_path, prefix_length)
    }

    pub fn engine(&self, prefix_length: usize) -> LookupEngine {
        LookupEngine::open(self.config(prefix_length)).expect("Failed to open engine")
    }

    /// Engine with a tweaked configuration
    pub fn engine_with(
        &self,
        prefix_length: usize,
        tweak: impl FnOnce(EngineConfig) -> EngineConfig,
    ) -> LookupEngine {
        LookupEngine::open(tweak(self.config(prefix_length))).expect("Failed to open engine")
    }
}

/// `prefix,offset` lines for the first row of every prefix
pub fn build_index(rows: &[&str], prefix_length: usize) -> String {
    let mut seen = HashSet::new();
    let mut index = String::new();
    let mut offset = 0usize;

    for row in rows {
        let key = row.split(',').next().unwrap_or("");
        if key.chars().count() >= prefix_length {
            let prefix: String = key.chars().take(prefix_length).collect();
            if seen.insert(prefix.clone()) {
                index.push_str(&format!("{},{}\n", prefix, offset));
            }
        }
        offset += row.len() + 1;
    }

    index
}

/// Convenience for comparing rows
pub fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}
