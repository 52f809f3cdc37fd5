//! Raw feed records -> canonical events
//!
//! Dedups by explicit id, then link, then `title|link`; the first record seen
//! wins. Event ids are content hashes, so re-running over the same batch gives
//! the same set.

use super::taxonomy::EventTaxonomy;
use super::types::{Event, RawEventRecord};
use crate::timeparse::parse_published;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Keywords that mark an emphasised headline
pub const EMPHASIS_KEYWORDS: [&str; 17] = [
    "긴급", "속보", "전격", "대규모", "확대", "중단", "폐지", "인하", "인상", "완화", "강화",
    "수혜", "악재", "호재", "수주", "계약", "출시",
];

const EVENT_ID_HEX_LEN: usize = 24;

fn dedup_key(record: &RawEventRecord) -> String {
    if !record.id.is_empty() {
        record.id.clone()
    } else if !record.link.is_empty() {
        record.link.clone()
    } else {
        format!("{}|{}", record.title, record.link)
    }
}

/// First 24 hex chars of SHA-256 over the id, or `title|link` when there is none
pub fn event_id(record: &RawEventRecord) -> String {
    let basis = if record.id.is_empty() {
        format!("{}|{}", record.title, record.link)
    } else {
        record.id.clone()
    };
    let digest = Sha256::digest(basis.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(EVENT_ID_HEX_LEN);
    id
}

/// Emphasis keyword occurrences over title and summary, /3, capped at 1
pub fn salience(title: &str, summary: &str) -> f64 {
    let text = format!("{} {}", title, summary);
    let count: usize = EMPHASIS_KEYWORDS
        .iter()
        .map(|kw| text.matches(kw).count())
        .sum();
    (count as f64 / 3.0).min(1.0)
}

/// Normalize one raw batch
///
/// Output is sorted by `published_ts` ascending with unparsable timestamps last;
/// ties keep input order.
pub fn normalize_events(records: &[RawEventRecord], taxonomy: &EventTaxonomy) -> Vec<Event> {
    let mut seen_keys = HashSet::new();
    let mut seen_titles: HashSet<&str> = HashSet::new();
    let mut seen_links: HashSet<&str> = HashSet::new();
    let mut events = Vec::new();

    for record in records {
        if !seen_keys.insert(dedup_key(record)) {
            continue;
        }

        let duplicate = seen_titles.contains(record.title.as_str())
            || seen_links.contains(record.link.as_str());
        seen_titles.insert(record.title.as_str());
        seen_links.insert(record.link.as_str());

        events.push(Event {
            event_id: event_id(record),
            published_ts: parse_published(&record.published),
            event_type: taxonomy.classify(&record.title, &record.summary).to_string(),
            title: record.title.clone(),
            summary: record.summary.clone(),
            link: record.link.clone(),
            source: record.source.clone(),
            feed_name: record.feed_name.clone(),
            salience: salience(&record.title, &record.summary),
            novelty: if duplicate { 0 } else { 1 },
            polarity: None,
            impact_strength: None,
            confidence: None,
            base_signal: None,
        });
    }

    if events.len() != records.len() {
        log::info!("🧹 Dedup by id/link: {} -> {}", records.len(), events.len());
    }

    // Option<T> orders None first, so sort on "is none" before the value
    events.sort_by_key(|e| (e.published_ts.is_none(), e.published_ts));
    events
}
