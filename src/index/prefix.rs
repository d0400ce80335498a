//! In-memory prefix index
//!
//! Maps a fixed-length key prefix to the byte offset of the first data row
//! carrying that prefix. Built once from a two-column CSV
//! (`prefix,offset`) and immutable afterwards, so concurrent readers
//! need no locking.
//!
//! The index cannot verify that same-prefix rows are contiguous in the
//! data file; that is a precondition on whoever produced the files.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::observability::{log_event_with_fields, Event, ObservationScope};

use super::errors::{IndexError, IndexResult};

/// Returns the first `prefix_length` characters of `key`, or `None` when
/// the key is shorter than that.
///
/// Length is counted in Unicode scalar values so a prefix never splits a
/// multi-byte character.
pub fn prefix_of(key: &str, prefix_length: usize) -> Option<&str> {
    match key.char_indices().nth(prefix_length) {
        Some((end, _)) => Some(&key[..end]),
        None if key.chars().count() == prefix_length => Some(key),
        None => None,
    }
}

/// Row counts from an index load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows accepted (duplicates included; the last one wins)
    pub loaded: u64,
    /// Malformed rows dropped
    pub skipped: u64,
}

/// Immutable prefix -> offset map
#[derive(Debug)]
pub struct PrefixIndex {
    prefix_length: usize,
    entries: HashMap<String, u64>,
    /// Lower-cased prefix -> every cased variant, ascending by offset
    folded: HashMap<String, Vec<(u64, String)>>,
    stats: LoadStats,
}

impl PrefixIndex {
    /// Builds the index from the CSV at `path`.
    ///
    /// Fails only when the file cannot be opened or read at the I/O level.
    /// Rows with a missing or non-numeric offset, or a prefix that is not
    /// exactly `prefix_length` characters, are skipped.
    pub fn build(path: &Path, prefix_length: usize) -> IndexResult<Self> {
        if prefix_length == 0 {
            return Err(IndexError::InvalidPrefixLength(prefix_length));
        }

        let path_str = path.display().to_string();
        let scope = ObservationScope::with_fields("INDEX_LOAD", &[("path", path_str.as_str())]);

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                scope.fail(&source.to_string());
                return Err(IndexError::Open {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match Self::load(file, path, prefix_length) {
            Ok(index) => {
                let prefixes = index.len().to_string();
                let skipped = index.stats.skipped.to_string();
                scope.complete_with_fields(&[
                    ("prefixes", prefixes.as_str()),
                    ("skipped", skipped.as_str()),
                ]);
                Ok(index)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    /// Builds the index from any reader producing index CSV.
    pub fn from_reader<R: Read>(reader: R, prefix_length: usize) -> IndexResult<Self> {
        if prefix_length == 0 {
            return Err(IndexError::InvalidPrefixLength(prefix_length));
        }
        Self::load(reader, Path::new("<reader>"), prefix_length)
    }

    fn load<R: Read>(reader: R, path: &Path, prefix_length: usize) -> IndexResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = HashMap::new();
        let mut stats = LoadStats::default();
        let mut record = csv::StringRecord::new();

        loop {
            let line = csv_reader.position().line();
            match csv_reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => {
                    return Err(IndexError::Read {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    stats.skipped += 1;
                    skip_row(line, &e.to_string());
                    continue;
                }
            }

            match parse_entry(&record, prefix_length) {
                Ok((prefix, offset)) => {
                    entries.insert(prefix.to_string(), offset);
                    stats.loaded += 1;
                }
                Err(reason) => {
                    stats.skipped += 1;
                    skip_row(line, reason);
                }
            }
        }

        let mut folded: HashMap<String, Vec<(u64, String)>> = HashMap::new();
        for (prefix, offset) in &entries {
            folded
                .entry(prefix.to_lowercase())
                .or_default()
                .push((*offset, prefix.clone()));
        }
        for variants in folded.values_mut() {
            variants.sort();
        }

        Ok(Self {
            prefix_length,
            entries,
            folded,
            stats,
        })
    }

    /// Offset of the region for `prefix`, if indexed. No I/O.
    pub fn resolve(&self, prefix: &str) -> Option<u64> {
        self.entries.get(prefix).copied()
    }

    /// Every indexed prefix equal to `prefix` ignoring case, with its
    /// offset, in ascending offset order.
    pub fn resolve_ignore_case(&self, prefix: &str) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.folded
            .get(&prefix.to_lowercase())
            .into_iter()
            .flatten()
            .map(|(offset, prefix)| (prefix.as_str(), *offset))
    }

    /// Number of characters in every indexed prefix
    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    /// Number of distinct prefixes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no prefixes were loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row counts from construction
    pub fn load_stats(&self) -> LoadStats {
        self.stats
    }

    /// All entries, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn parse_entry(record: &csv::StringRecord, prefix_length: usize) -> Result<(&str, u64), &'static str> {
    let (prefix, offset) = match (record.get(0), record.get(1)) {
        (Some(prefix), Some(offset)) => (prefix, offset),
        _ => return Err("missing offset column"),
    };
    if prefix.chars().count() != prefix_length {
        return Err("prefix length mismatch");
    }
    let offset = offset
        .parse::<u64>()
        .map_err(|_| "offset is not a non-negative integer")?;
    Ok((prefix, offset))
}

fn skip_row(line: u64, reason: &str) {
    let line = line.to_string();
    log_event_with_fields(Event::IndexRowSkipped, &[("line", line.as_str()), ("reason", reason)]);
}
