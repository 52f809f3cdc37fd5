use crate::store::{SnapshotRecord, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw tick after column resolution, before timestamp parsing
#[derive(Debug, Clone, PartialEq)]
pub struct RawTick {
    pub ticker: String,
    pub ts_text: String,
    pub volume: f64,
    pub price: Option<f64>,
}

/// Volume traded by one ticker in one UTC minute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    pub ticker: String,
    pub ts: DateTime<Utc>,
    pub volume: f64,
    pub price: Option<f64>,
}

impl SnapshotRecord for MarketBar {
    const STAGE: Stage = Stage::Market;
}
