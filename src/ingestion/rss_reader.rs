//! Raw feed dumps (`rss_*.csv`)

use crate::columns::{field, read_lossy};
use crate::error::Result;
use crate::eventing::RawEventRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Lexicographically last `rss_*.csv` in `dir`
///
/// Dump names embed a sortable timestamp, so the last one is the latest.
pub fn latest_raw_events_file(dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(None);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_dump = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("rss_") && n.ends_with(".csv"))
            .unwrap_or(false);
        if is_dump && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.pop())
}

/// Read every row; missing columns read as empty strings
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the dump.
pub fn read_raw_events(path: impl AsRef<Path>) -> Result<Vec<RawEventRecord>> {
    let path = path.as_ref();
    let (resolver, rows) = read_lossy(path)?;

    let idx = |name: &str| resolver.find(&[name]);
    let columns = [
        idx("id"),
        idx("title"),
        idx("link"),
        idx("published"),
        idx("summary"),
        idx("source"),
        idx("feed_name"),
    ];
    let get = |record: &csv::StringRecord, col: Option<usize>| -> String {
        col.map(|i| field(record, i).to_string()).unwrap_or_default()
    };

    let mut records = Vec::with_capacity(rows.len());
    for record in &rows {
        records.push(RawEventRecord {
            id: get(record, columns[0]),
            title: get(record, columns[1]),
            link: get(record, columns[2]),
            published: get(record, columns[3]),
            summary: get(record, columns[4]),
            source: get(record, columns[5]),
            feed_name: get(record, columns[6]),
        });
    }

    log::info!("📥 Loaded raw feed: {} ({} rows)", path.display(), records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_latest_file_by_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rss_20240101_090000.csv"), "id\n").unwrap();
        fs::write(dir.path().join("rss_20240102_090000.csv"), "id\n").unwrap();
        fs::write(dir.path().join("other.csv"), "id\n").unwrap();

        let latest = latest_raw_events_file(dir.path()).unwrap().unwrap();
        assert_eq!(latest.file_name().unwrap(), "rss_20240102_090000.csv");
    }

    #[test]
    fn test_no_dump_is_none() {
        let dir = tempdir().unwrap();
        assert!(latest_raw_events_file(dir.path()).unwrap().is_none());
        assert!(latest_raw_events_file(dir.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn test_missing_columns_default_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rss_1.csv");
        fs::write(
            &path,
            "title,link,published\n\"정부 규제 완화, 발표\",http://a,2024-01-02 10:00:00\nshort\n",
        )
        .unwrap();

        let records = read_raw_events(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "정부 규제 완화, 발표");
        assert_eq!(records[0].id, "");
        assert_eq!(records[0].feed_name, "");
        assert_eq!(records[1].title, "short");
        assert_eq!(records[1].link, "");
    }

    #[test]
    fn test_non_utf8_row_is_kept() {
        // Test: a cp949-encoded title degrades to replacement chars, other rows survive
        let dir = tempdir().unwrap();
        let path = dir.path().join("rss_2.csv");
        let mut content = b"title,link,published\n".to_vec();
        content.extend_from_slice(b"first,http://a,2024-01-02 10:00:00\n");
        content.extend_from_slice(b"\xbb\xef\xbc\xba,http://b,2024-01-02 10:05:00\n");
        content.extend_from_slice(b"third,http://c,\n");
        fs::write(&path, content).unwrap();

        let records = read_raw_events(&path).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[1].title.contains('\u{fffd}'));
        assert_eq!(records[1].link, "http://b");
        assert_eq!(records[2].title, "third");
    }
}
