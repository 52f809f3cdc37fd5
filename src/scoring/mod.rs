//! Event scoring: polarity, impact strength, confidence, base signal
//!
//! Each score is a pure function of one event and the configured weights, so the
//! pass recomputes from scratch on every run.

use crate::config::{ConfidenceWeights, ImpactWeights, PolarityWeights, WeightParams};
use crate::eventing::Event;
use chrono::{DateTime, Utc};

/// Impact raw scores are scaled so a 1.2 type weight saturates at 1.0
const IMPACT_SCALE: f64 = 1.2;

/// Clamp to [0, 1]; NaN becomes 0
pub fn clip01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Clamp to [-1, 1]; NaN becomes 0
pub fn clip11(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}

/// Number of keywords present in `text` (presence, not occurrences)
fn keyword_hits(text: &str, keywords: &[String]) -> usize {
    if text.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();
    keywords
        .iter()
        .filter(|kw| !kw.is_empty() && text.contains(&kw.to_lowercase()))
        .count()
}

/// (pos - neg) / (pos + neg), with title and summary counted independently
pub fn polarity(title: &str, summary: &str, weights: &PolarityWeights) -> f64 {
    let pos = keyword_hits(title, &weights.positive_kws) + keyword_hits(summary, &weights.positive_kws);
    let neg = keyword_hits(title, &weights.negative_kws) + keyword_hits(summary, &weights.negative_kws);

    let total = pos + neg;
    let denom = if total > 0 { total as f64 } else { 1.0 };
    clip11((pos as f64 - neg as f64) / denom)
}

pub fn impact_strength(event_type: &str, salience: f64, novelty: u8, weights: &ImpactWeights) -> f64 {
    let salience = if salience.is_nan() { 0.0 } else { salience };
    let raw = weights.type_weight(event_type)
        * (weights.salience_weight * salience + weights.novelty_weight * f64::from(novelty));
    clip01(raw / IMPACT_SCALE)
}

/// Minutes between `published` and `now`, floored at zero
///
/// A missing timestamp counts as very old so it decays to the confidence floor.
fn age_minutes(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match published {
        Some(ts) => ((now - ts).num_milliseconds() as f64 / 60_000.0).max(0.0),
        None => 1e9,
    }
}

pub fn confidence(
    feed_name: &str,
    source: &str,
    published: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    weights: &ConfidenceWeights,
) -> f64 {
    let trust = weights.trust_for(feed_name, source);
    let age = age_minutes(published, now);
    let decay = if age <= 0.0 {
        1.0
    } else {
        1.0 / (1.0 + age / weights.time_decay_minutes.max(1.0))
    };
    clip01((trust * decay).max(weights.min_confidence))
}

pub fn base_signal(polarity: f64, impact_strength: f64, confidence: f64) -> f64 {
    clip11(polarity * impact_strength * confidence)
}

/// Fill the score fields of every event, in place
pub fn score_events(events: &mut [Event], weights: &WeightParams, now: DateTime<Utc>) {
    for event in events.iter_mut() {
        let pol = polarity(&event.title, &event.summary, &weights.polarity);
        let impact = impact_strength(
            &event.event_type,
            event.salience,
            event.novelty,
            &weights.impact,
        );
        let conf = confidence(
            &event.feed_name,
            &event.source,
            event.published_ts,
            now,
            &weights.confidence,
        );

        event.polarity = Some(pol);
        event.impact_strength = Some(impact);
        event.confidence = Some(conf);
        event.base_signal = Some(base_signal(pol, impact, conf));
    }
}
