//! Header resolution for heterogeneous CSV inputs
//!
//! Raw exports name the same logical column differently (`ticker`, `symbol`,
//! `종목코드`, ...). A resolver maps each logical field to the first candidate
//! header present, compared case-insensitively.

use crate::error::Result;
use csv::{ByteRecord, StringRecord};
use std::collections::HashMap;
use std::path::Path;

pub struct ColumnResolver {
    index: HashMap<String, usize>,
}

impl ColumnResolver {
    pub fn new(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers
            index
                .entry(header.trim().trim_start_matches('\u{feff}').to_lowercase())
                .or_insert(i);
        }
        Self { index }
    }

    /// Position of the first candidate present in the header row
    pub fn find(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| self.index.get(&c.to_lowercase()).copied())
    }
}

/// Decode a raw row, replacing invalid UTF-8 with U+FFFD
pub fn lossy_record(record: &ByteRecord) -> StringRecord {
    record.iter().map(String::from_utf8_lossy).collect()
}

/// Header resolver plus every row of a CSV file, decoded lossily
///
/// Rows the CSV parser rejects are skipped with a warning; only I/O failures
/// abort the read.
pub fn read_lossy(path: &Path) -> Result<(ColumnResolver, Vec<StringRecord>)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let resolver = ColumnResolver::new(&lossy_record(reader.byte_headers()?));

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.byte_records() {
        match record {
            Ok(record) => rows.push(lossy_record(&record)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                log::debug!("{}: skipping row: {}", path.display(), e);
            }
        }
    }

    if skipped > 0 {
        log::warn!("⚠️  {}: skipped {} malformed rows", path.display(), skipped);
    }
    Ok((resolver, rows))
}

/// Field value at `idx`, trimmed; empty when the row is short
pub fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate_wins() {
        let headers = StringRecord::from(vec!["Symbol", "Volume", "ticker"]);
        let resolver = ColumnResolver::new(&headers);

        assert_eq!(resolver.find(&["ticker", "symbol"]), Some(2));
        assert_eq!(resolver.find(&["symbol", "ticker"]), Some(0));
        assert_eq!(resolver.find(&["volume"]), Some(1));
        assert_eq!(resolver.find(&["price", "close"]), None);
    }

    #[test]
    fn test_bom_and_whitespace_are_ignored() {
        let headers = StringRecord::from(vec!["\u{feff}종목코드", " 거래량 "]);
        let resolver = ColumnResolver::new(&headers);

        assert_eq!(resolver.find(&["ticker", "종목코드"]), Some(0));
        assert_eq!(resolver.find(&["거래량"]), Some(1));
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        std::fs::write(&path, b"title,link\n\xbb\xe7\xbc\xba,http://a\nok,http://b\n").unwrap();

        let (resolver, rows) = read_lossy(&path).unwrap();

        assert_eq!(resolver.find(&["link"]), Some(1));
        assert_eq!(rows.len(), 2);
        assert!(field(&rows[0], 0).contains('\u{fffd}'));
        assert_eq!(field(&rows[0], 1), "http://a");
        assert_eq!(field(&rows[1], 0), "ok");
    }

    #[test]
    fn test_short_row_field_is_empty() {
        let record = StringRecord::from(vec!["a"]);
        assert_eq!(field(&record, 0), "a");
        assert_eq!(field(&record, 3), "");
    }
}
