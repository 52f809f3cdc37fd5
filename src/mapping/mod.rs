//! Event -> ticker linking by alias matching
//!
//! Names and brands are matched as case-insensitive substrings of the title and
//! summary after whitespace normalization. The weighted hit/count score is kept
//! alongside its inputs so a link can be audited later.

use crate::config::{RelevanceWeights, SourcesConfig, TickerAliases};
use crate::eventing::Event;
use crate::scoring::clip01;
use crate::store::{SnapshotRecord, Stage};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Explainability payload of one link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkFeatures {
    pub name_hit: u8,
    pub brand_hit: u8,
    pub name_count_title: usize,
    pub brand_count_title: usize,
    pub name_count_summary: usize,
    pub brand_count_summary: usize,
    pub salience: f64,
    pub raw_score: f64,
    pub norm_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    pub event_id: String,
    pub ticker: String,
    pub relevance_score: f64,
    pub features: LinkFeatures,
}

impl SnapshotRecord for EntityLink {
    const STAGE: Stage = Stage::Mapping;
}

/// Trim, lower-case, and collapse runs of whitespace to one space
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

struct AliasMatcher {
    names: Vec<String>,
    brands: Vec<String>,
}

impl AliasMatcher {
    fn new(aliases: &TickerAliases) -> Self {
        let prepare = |keys: &[String]| {
            keys.iter()
                .map(|k| normalize_text(k))
                .filter(|k| !k.is_empty())
                .collect()
        };
        Self {
            names: prepare(&aliases.names),
            brands: prepare(&aliases.brands),
        }
    }
}

fn contains_any(text: &str, keys: &[String]) -> bool {
    keys.iter().any(|k| text.contains(k.as_str()))
}

/// Total non-overlapping occurrences of every key
fn count_in(text: &str, keys: &[String]) -> usize {
    keys.iter().map(|k| text.matches(k.as_str()).count()).sum()
}

/// Score one (event, ticker) pair
pub fn score_link(
    title: &str,
    summary: &str,
    salience: f64,
    aliases: &TickerAliases,
    weights: &RelevanceWeights,
) -> LinkFeatures {
    let matcher = AliasMatcher::new(aliases);
    score_with_matcher(&normalize_text(title), &normalize_text(summary), salience, &matcher, weights)
}

fn score_with_matcher(
    title: &str,
    summary: &str,
    salience: f64,
    matcher: &AliasMatcher,
    weights: &RelevanceWeights,
) -> LinkFeatures {
    let salience = if salience.is_finite() { salience } else { 0.0 };

    let name_hit = contains_any(title, &matcher.names) || contains_any(summary, &matcher.names);
    let brand_hit = contains_any(title, &matcher.brands) || contains_any(summary, &matcher.brands);

    let name_count_title = count_in(title, &matcher.names);
    let brand_count_title = count_in(title, &matcher.brands);
    let name_count_summary = count_in(summary, &matcher.names);
    let brand_count_summary = count_in(summary, &matcher.brands);

    let raw_score = weights.name_hit * f64::from(u8::from(name_hit))
        + weights.brand_hit * f64::from(u8::from(brand_hit))
        + weights.title_keyword * (name_count_title + brand_count_title) as f64
        + weights.summary_keyword * (name_count_summary + brand_count_summary) as f64
        + weights.salience_boost * salience;

    let max_raw = if weights.max_raw > 0.0 { weights.max_raw } else { 1.0 };

    LinkFeatures {
        name_hit: u8::from(name_hit),
        brand_hit: u8::from(brand_hit),
        name_count_title,
        brand_count_title,
        name_count_summary,
        brand_count_summary,
        salience,
        raw_score,
        norm_score: clip01(raw_score / max_raw),
    }
}

/// Link every event against every ticker that has a name or brand
///
/// Zero-score pairs are dropped. Output is ordered by event id, then relevance
/// descending; ties keep event order then ticker order.
pub fn link_entities(
    events: &[Event],
    sources: &SourcesConfig,
    weights: &RelevanceWeights,
) -> Vec<EntityLink> {
    let matchers: Vec<(&str, AliasMatcher)> = sources
        .linkable()
        .map(|(ticker, aliases)| (ticker, AliasMatcher::new(aliases)))
        .collect();

    if matchers.is_empty() {
        log::warn!("⚠️  Alias dictionary is empty, no entity links produced");
        return Vec::new();
    }

    let mut links = Vec::new();
    for event in events {
        let title = normalize_text(&event.title);
        let summary = normalize_text(&event.summary);

        for (ticker, matcher) in &matchers {
            let features = score_with_matcher(&title, &summary, event.salience, matcher, weights);
            if features.norm_score <= 0.0 {
                continue;
            }
            links.push(EntityLink {
                event_id: event.event_id.clone(),
                ticker: ticker.to_string(),
                relevance_score: features.norm_score,
                features,
            });
        }
    }

    links.sort_by(|a, b| {
        a.event_id.cmp(&b.event_id).then_with(|| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
        })
    });
    links
}
