//! Per-event top-N of entity links by relevance

use super::dense_rank::dense_rank_by_group;
use crate::eventing::Event;
use crate::mapping::{EntityLink, LinkFeatures};
use crate::store::{SnapshotRecord, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// An entity link with event metadata and its relevance rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceEntry {
    pub event_id: String,
    pub ticker: String,
    pub relevance_score: f64,
    pub features: LinkFeatures,
    pub published_ts: Option<DateTime<Utc>>,
    pub event_type: Option<String>,
    pub base_signal: Option<f64>,
    pub salience: Option<f64>,
    pub novelty: Option<u8>,
    pub rank_relevance: u32,
}

impl SnapshotRecord for RelevanceEntry {
    const STAGE: Stage = Stage::Rankings;
}

/// Rank links per event and keep ranks `<= top_n`
///
/// Event metadata is left-joined: a link whose event is unknown keeps empty
/// metadata rather than being dropped.
pub fn rank_by_relevance(links: &[EntityLink], events: &[Event], top_n: u32) -> Vec<RelevanceEntry> {
    let mut by_id: HashMap<&str, &Event> = HashMap::new();
    for event in events {
        by_id.entry(event.event_id.as_str()).or_insert(event);
    }

    let ranks = dense_rank_by_group(links, |l| l.event_id.as_str(), |l| l.relevance_score);

    let mut entries: Vec<RelevanceEntry> = links
        .iter()
        .zip(ranks)
        .filter(|(_, rank)| *rank <= top_n)
        .map(|(link, rank)| {
            let event = by_id.get(link.event_id.as_str());
            RelevanceEntry {
                event_id: link.event_id.clone(),
                ticker: link.ticker.clone(),
                relevance_score: link.relevance_score,
                features: link.features.clone(),
                published_ts: event.and_then(|e| e.published_ts),
                event_type: event.map(|e| e.event_type.clone()),
                base_signal: event.and_then(|e| e.base_signal),
                salience: event.map(|e| e.salience),
                novelty: event.map(|e| e.novelty),
                rank_relevance: rank,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.event_id
            .cmp(&b.event_id)
            .then(a.rank_relevance.cmp(&b.rank_relevance))
            .then_with(|| {
                b.relevance_score
                    .partial_cmp(&a.relevance_score)
                    .unwrap_or(Ordering::Equal)
            })
    });
    entries
}
