//! Raw feed records and normalized events

use crate::store::{SnapshotRecord, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a raw feed dump; absent columns read as empty strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEventRecord {
    pub id: String,
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    pub source: String,
    pub feed_name: String,
}

/// One normalized news item
///
/// Score fields are `None` until the scoring pass has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub published_ts: Option<DateTime<Utc>>,
    pub event_type: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub feed_name: String,
    pub salience: f64,
    pub novelty: u8,
    #[serde(default)]
    pub polarity: Option<f64>,
    #[serde(default)]
    pub impact_strength: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub base_signal: Option<f64>,
}

impl Event {
    pub fn is_scored(&self) -> bool {
        self.base_signal.is_some()
    }
}

impl SnapshotRecord for Event {
    const STAGE: Stage = Stage::Events;
}
