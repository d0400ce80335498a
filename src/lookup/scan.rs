//! Same-prefix region scans
//!
//! Both scans read CSV records forward from wherever the reader is
//! positioned and stop at the first record whose own prefix differs from
//! the region's prefix, or at end of file. Records whose key is shorter
//! than the prefix are skipped without ending the region.
//!
//! Records are read as raw bytes. Only the key is decoded to compare
//! prefixes; a key that is not UTF-8 never matches and ends the region.
//! Matched rows are decoded lossily.

use std::io::Read;
use std::ops::ControlFlow;

use csv::ByteRecord;

use crate::index::prefix_of;

use super::errors::LookupResult;

/// One data-file row, fields in file order
pub type Row = Vec<String>;

fn to_row(record: &ByteRecord) -> Row {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Walks the region starting at the reader's current position, handing
/// each same-prefix record and its key to `visit` until it breaks.
/// Returns the number of records read.
pub(crate) fn scan_region<R, F>(
    source: R,
    prefix: &str,
    prefix_length: usize,
    mut visit: F,
) -> LookupResult<u64>
where
    R: Read,
    F: FnMut(&str, &ByteRecord) -> ControlFlow<()>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut record = ByteRecord::new();
    let mut scanned = 0;

    while reader.read_byte_record(&mut record)? {
        scanned += 1;

        let Ok(key) = std::str::from_utf8(record.get(0).unwrap_or_default()) else {
            break;
        };
        let Some(record_prefix) = prefix_of(key, prefix_length) else {
            continue;
        };
        if record_prefix != prefix {
            break;
        }
        if visit(key, &record).is_break() {
            break;
        }
    }

    Ok(scanned)
}

/// Finds the record whose key equals `key` exactly.
pub(crate) fn find_exact<R: Read>(
    source: R,
    key: &str,
    prefix: &str,
    prefix_length: usize,
) -> LookupResult<(Option<Row>, u64)> {
    let mut found = None;
    let scanned = scan_region(source, prefix, prefix_length, |record_key, record| {
        if record_key == key {
            found = Some(to_row(record));
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;
    Ok((found, scanned))
}

/// Appends every record whose key contains `needle_lower`, ignoring case,
/// until `rows` holds `limit` entries. `needle_lower` must already be
/// lower-cased.
pub(crate) fn collect_partial<R: Read>(
    source: R,
    needle_lower: &str,
    prefix: &str,
    prefix_length: usize,
    limit: Option<usize>,
    rows: &mut Vec<Row>,
) -> LookupResult<u64> {
    scan_region(source, prefix, prefix_length, |key, record| {
        if key.to_lowercase().contains(needle_lower) {
            rows.push(to_row(record));
            if limit.is_some_and(|limit| rows.len() >= limit) {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "\
aa1,first
aa2,second
a,short
aa3,third
ab1,other
aa4,after
";

    #[test]
    fn test_find_exact_in_region() {
        let (row, _) = find_exact(DATA.as_bytes(), "aa3", "aa", 2).unwrap();
        assert_eq!(row, Some(vec!["aa3".to_string(), "third".to_string()]));
    }

    #[test]
    fn test_find_exact_stops_at_region_end() {
        // aa4 exists but lies beyond the first prefix change
        let (row, scanned) = find_exact(DATA.as_bytes(), "aa4", "aa", 2).unwrap();
        assert_eq!(row, None);
        assert_eq!(scanned, 5);
    }

    #[test]
    fn test_find_exact_stops_on_match() {
        let (row, scanned) = find_exact(DATA.as_bytes(), "aa1", "aa", 2).unwrap();
        assert!(row.is_some());
        assert_eq!(scanned, 1);
    }

    #[test]
    fn test_find_exact_at_eof() {
        let (row, _) = find_exact("aa1,x\naa2,y".as_bytes(), "aa9", "aa", 2).unwrap();
        assert_eq!(row, None);
    }

    #[test]
    fn test_find_exact_requires_full_key() {
        let (row, _) = find_exact(DATA.as_bytes(), "aa", "aa", 2).unwrap();
        assert_eq!(row, None);
    }

    #[test]
    fn test_short_key_does_not_end_region() {
        let (row, _) = find_exact("a,x\naa1,y\n".as_bytes(), "aa1", "aa", 2).unwrap();
        assert_eq!(row, Some(vec!["aa1".to_string(), "y".to_string()]));
    }

    #[test]
    fn test_collect_partial_respects_limit() {
        let mut rows = Vec::new();
        collect_partial(DATA.as_bytes(), "aa", "aa", 2, Some(2), &mut rows).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "aa1");
        assert_eq!(rows[1][0], "aa2");
    }

    #[test]
    fn test_collect_partial_unbounded() {
        let mut rows = Vec::new();
        collect_partial(DATA.as_bytes(), "aa", "aa", 2, None, &mut rows).unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(keys, vec!["aa1", "aa2", "aa3"]);
    }

    #[test]
    fn test_collect_partial_ignores_case() {
        let mut rows = Vec::new();
        collect_partial("AbC1,x\nabc2,y\n".as_bytes(), "abc", "Ab", 2, None, &mut rows).unwrap();
        // abc2 has prefix "ab", a different region from "Ab"
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "AbC1");
    }

    #[test]
    fn test_quoted_fields_preserved() {
        let (row, _) =
            find_exact("aa1,\"hello, world\",3\n".as_bytes(), "aa1", "aa", 2).unwrap();
        assert_eq!(
            row,
            Some(vec![
                "aa1".to_string(),
                "hello, world".to_string(),
                "3".to_string()
            ])
        );
    }

    #[test]
    fn test_ragged_records_allowed() {
        let (row, _) = find_exact("aa1\naa2,b,c,d\n".as_bytes(), "aa2", "aa", 2).unwrap();
        assert_eq!(row.map(|r| r.len()), Some(4));
    }

    #[test]
    fn test_non_utf8_key_ends_region() {
        let data: &[u8] = b"aa1,x\n\xE9a1,y\naa2,z\n";
        let (row, scanned) = find_exact(data, "aa2", "aa", 2).unwrap();
        assert_eq!(row, None);
        assert_eq!(scanned, 2);
    }

    #[test]
    fn test_non_utf8_field_decoded_lossily() {
        let data: &[u8] = b"aa1,caf\xE9\n";
        let (row, _) = find_exact(data, "aa1", "aa", 2).unwrap();
        assert_eq!(row, Some(vec!["aa1".to_string(), "caf\u{FFFD}".to_string()]));
    }
}
