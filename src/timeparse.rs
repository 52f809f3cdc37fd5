//! Lenient timestamp parsing for feed and market inputs
//!
//! Raw sources disagree on formats: RSS feeds mostly emit RFC 2822 with either a
//! numeric offset or a zone abbreviation ("KST"), tick dumps emit naive local
//! times. Every parser here returns `None` instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Fixed market timezone for naive tick timestamps
pub const MARKET_TZ: Tz = chrono_tz::Asia::Seoul;

/// Zone abbreviations mapped to their fixed UTC offsets
const ZONE_ABBREVIATIONS: [(&str, &str); 16] = [
    ("KST", "+0900"),
    ("JST", "+0900"),
    ("HKT", "+0800"),
    ("SGT", "+0800"),
    ("CEST", "+0200"),
    ("CET", "+0100"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("UT", "+0000"),
    ("Z", "+0000"),
    ("EDT", "-0400"),
    ("EST", "-0500"),
    ("CDT", "-0500"),
    ("CST", "-0600"),
    ("PDT", "-0700"),
    ("PST", "-0800"),
];

const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M %z",
];

const NAIVE_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y%m%d %H:%M:%S",
    "%Y%m%d %H%M%S",
    "%Y%m%d%H%M%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

/// Parse a feed `published` value. Naive values are taken as UTC.
pub fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    parse_with_zone(text, &chrono_tz::UTC)
}

/// Parse a tick timestamp. Naive values are local to [`MARKET_TZ`].
pub fn parse_market_ts(text: &str) -> Option<DateTime<Utc>> {
    parse_with_zone(text, &MARKET_TZ)
}

/// Parse `text`, localising zone-less values in `naive_zone`
pub fn parse_with_zone(text: &str, naive_zone: &Tz) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let text = replace_zone_abbreviation(trimmed);

    if let Ok(ts) = DateTime::parse_from_rfc2822(&text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(&text) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&text, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    // Nonexistent local times (DST gaps) become null, ambiguous ones take the earlier instant
    naive_zone
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Truncate to the start of the minute
pub fn floor_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

fn replace_zone_abbreviation(text: &str) -> String {
    if let Some((head, last)) = text.rsplit_once(' ') {
        if let Some((_, offset)) = ZONE_ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == last) {
            return format!("{} {}", head.trim_end(), offset);
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc2822_with_kst_abbreviation() {
        let ts = parse_published("Tue, 02 Jan 2024 10:00:00 KST").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 1, 0, 0));
    }

    #[test]
    fn test_rfc2822_with_numeric_offset() {
        let ts = parse_published("Tue, 02 Jan 2024 10:00:00 +0900").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 1, 0, 0));
    }

    #[test]
    fn test_plain_datetime_with_abbreviation() {
        let ts = parse_published("2024-01-02 10:00:00 KST").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 1, 0, 0));
    }

    #[test]
    fn test_rfc3339() {
        let ts = parse_published("2024-01-02T10:00:00+09:00").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 1, 0, 0));
    }

    #[test]
    fn test_naive_published_is_utc() {
        let ts = parse_published("2024-01-02 10:00:00").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 10, 0, 0));
    }

    #[test]
    fn test_naive_market_ts_is_seoul_local() {
        let ts = parse_market_ts("2024-01-02 09:00:30").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 0, 0, 30));
    }

    #[test]
    fn test_market_ts_with_offset_is_not_relocalised() {
        let ts = parse_market_ts("2024-01-02T09:00:00Z").unwrap();
        assert_eq!(ts, utc(2024, 1, 2, 9, 0, 0));
    }

    #[test]
    fn test_unparsable_is_none() {
        assert!(parse_published("").is_none());
        assert!(parse_published("   ").is_none());
        assert!(parse_published("not a date").is_none());
        assert!(parse_market_ts("2024-13-45 99:99").is_none());
    }

    #[test]
    fn test_floor_to_minute() {
        let ts = parse_published("2024-01-02 10:05:59.750").unwrap();
        assert_eq!(floor_to_minute(ts), utc(2024, 1, 2, 10, 5, 0));
    }
}
