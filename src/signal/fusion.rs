//! Fusion of base signal, relevance rank and volume uplift into one decision
//!
//! The two ranking axes are outer-joined on (event_id, ticker); a pair missing
//! from one axis scores zero on it.

use super::decision::{Decision, DecisionPolicy};
use crate::config::{PipelineParams, SignalWeights};
use crate::eventing::Event;
use crate::ranking::{RelevanceEntry, VolumeEntry};
use crate::scoring::clip01;
use crate::store::{SnapshotRecord, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub event_id: String,
    pub ticker: String,
    pub buy_score: f64,
    pub decision: Decision,
    pub reason: String,
    pub base_signal: f64,
    pub base_signal_norm: f64,
    pub rel_score: f64,
    pub vol_score: f64,
    pub mix_term: f64,
    pub rank_relevance: Option<u32>,
    pub relevance_score: Option<f64>,
    pub rank_volume: Option<u32>,
    pub volume_uplift: f64,
    pub abn_volume_z: f64,
    pub event_type: String,
    pub published_ts: Option<DateTime<Utc>>,
    pub title: String,
    pub summary: String,
}

impl SnapshotRecord for Signal {
    const STAGE: Stage = Stage::Signals;
}

/// Score components of one pair, before the decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionScore {
    pub base_signal_norm: f64,
    pub rel_score: f64,
    pub vol_score: f64,
    pub mix_term: f64,
    pub buy_score: f64,
}

/// `[-1, 1] -> [0, 1]`
pub fn normalize_base_signal(base_signal: f64) -> f64 {
    let base = if base_signal.is_finite() { base_signal } else { 0.0 };
    (base + 1.0) / 2.0
}

/// `(N - rank + 1) / N` clipped to [0, 1]; an absent rank counts as `N + 1`
pub fn rank_score(rank: Option<u32>, top_n: u32) -> f64 {
    let n = f64::from(top_n.max(1));
    let rank = rank.map(f64::from).unwrap_or(n + 1.0);
    clip01((n - rank + 1.0) / n)
}

pub fn fuse_scores(
    base_signal: f64,
    rank_relevance: Option<u32>,
    volume_uplift: f64,
    top_n_relevance: u32,
    weights: &SignalWeights,
) -> FusionScore {
    let base_signal_norm = normalize_base_signal(base_signal);
    let rel_score = rank_score(rank_relevance, top_n_relevance);
    let vol_score = clip01(volume_uplift);
    let mix_term = rel_score * vol_score;
    let buy_score = clip01(
        weights.w_base * base_signal_norm
            + weights.w_rel * rel_score
            + weights.w_vol * vol_score
            + weights.w_mix * mix_term,
    );

    FusionScore {
        base_signal_norm,
        rel_score,
        vol_score,
        mix_term,
        buy_score,
    }
}

/// Human-readable trace of the contributing terms
fn build_reason(
    event_type: &str,
    published_ts: Option<DateTime<Utc>>,
    score: &FusionScore,
    effective_rank: u32,
    volume_uplift: f64,
    abn_volume_z: f64,
) -> String {
    let mut pieces = Vec::with_capacity(5);
    if !event_type.is_empty() {
        pieces.push(format!("event_type={}", event_type));
    }
    if let Some(ts) = published_ts {
        pieces.push(format!("published_utc={}", ts.format("%Y-%m-%d %H:%M:%S%:z")));
    }
    pieces.push(format!("base={:.2}", score.base_signal_norm));
    pieces.push(format!("rel={:.2}(rank={})", score.rel_score, effective_rank));
    pieces.push(format!(
        "vol={:.2}(uplift={:.2}, z={:.2})",
        score.vol_score, volume_uplift, abn_volume_z
    ));
    pieces.join(" | ")
}

#[derive(Default)]
struct JoinedPair<'a> {
    relevance: Option<&'a RelevanceEntry>,
    volume: Option<&'a VolumeEntry>,
}

/// Build one signal per (event_id, ticker) in either ranking
///
/// Output is ordered by event id, then buy score descending.
pub fn build_signals(
    events: &[Event],
    relevance: &[RelevanceEntry],
    volume: &[VolumeEntry],
    params: &PipelineParams,
) -> Vec<Signal> {
    let mut pairs: BTreeMap<(&str, &str), JoinedPair> = BTreeMap::new();
    for entry in relevance {
        pairs
            .entry((entry.event_id.as_str(), entry.ticker.as_str()))
            .or_default()
            .relevance
            .get_or_insert(entry);
    }
    for entry in volume {
        pairs
            .entry((
                entry.relevance.event_id.as_str(),
                entry.relevance.ticker.as_str(),
            ))
            .or_default()
            .volume
            .get_or_insert(entry);
    }

    let mut by_id: HashMap<&str, &Event> = HashMap::new();
    for event in events {
        by_id.entry(event.event_id.as_str()).or_insert(event);
    }

    let policy = DecisionPolicy::from_params(&params.thresholds);
    let top_n_relevance = params.topn.relevance;

    let mut signals: Vec<Signal> = pairs
        .into_iter()
        .map(|((event_id, ticker), pair)| {
            let event = by_id.get(event_id).copied();
            let base_signal = event
                .and_then(|e| e.base_signal)
                .filter(|b| b.is_finite())
                .unwrap_or(0.0);

            let rank_relevance = pair.relevance.map(|r| r.rank_relevance);
            let volume_uplift = pair
                .volume
                .map(|v| v.volume_uplift)
                .filter(|u| u.is_finite())
                .unwrap_or(0.0);
            let abn_volume_z = pair
                .volume
                .map(|v| v.abn_volume_z)
                .filter(|z| z.is_finite())
                .unwrap_or(0.0);

            let score = fuse_scores(
                base_signal,
                rank_relevance,
                volume_uplift,
                top_n_relevance,
                &params.weights.signal,
            );
            let decision = policy.decide(score.buy_score, base_signal);

            let event_type = event.map(|e| e.event_type.clone()).unwrap_or_default();
            let published_ts = event.and_then(|e| e.published_ts);
            let effective_rank = rank_relevance.unwrap_or(top_n_relevance.saturating_add(1));

            Signal {
                event_id: event_id.to_string(),
                ticker: ticker.to_string(),
                buy_score: score.buy_score,
                decision,
                reason: build_reason(
                    &event_type,
                    published_ts,
                    &score,
                    effective_rank,
                    volume_uplift,
                    abn_volume_z,
                ),
                base_signal,
                base_signal_norm: score.base_signal_norm,
                rel_score: score.rel_score,
                vol_score: score.vol_score,
                mix_term: score.mix_term,
                rank_relevance,
                relevance_score: pair
                    .relevance
                    .map(|r| r.relevance_score)
                    .or_else(|| pair.volume.map(|v| v.relevance.relevance_score)),
                rank_volume: pair.volume.map(|v| v.rank_volume),
                volume_uplift,
                abn_volume_z,
                event_type,
                published_ts,
                title: event.map(|e| e.title.clone()).unwrap_or_default(),
                summary: event.map(|e| e.summary.clone()).unwrap_or_default(),
            }
        })
        .collect();

    signals.sort_by(|a, b| {
        a.event_id.cmp(&b.event_id).then_with(|| {
            b.buy_score
                .partial_cmp(&a.buy_score)
                .unwrap_or(Ordering::Equal)
        })
    });
    signals
}
