//! Per-event top-N of relevance-ranked pairs by volume uplift

use super::dense_rank::dense_rank_by_group;
use super::relevance::RelevanceEntry;
use super::window::BarIndex;
use crate::config::{WindowParams, ZeroBaselinePolicy};
use crate::market::MarketBar;
use crate::store::{SnapshotRecord, Stage};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeEntry {
    #[serde(flatten)]
    pub relevance: RelevanceEntry,
    pub baseline_mean: f64,
    pub baseline_std: f64,
    pub post_mean: f64,
    pub volume_uplift: f64,
    pub abn_volume_z: f64,
    pub rank_volume: u32,
}

impl SnapshotRecord for VolumeEntry {
    const STAGE: Stage = Stage::RankingsVolume;
}

pub fn rank_by_volume(
    rankings: &[RelevanceEntry],
    bars: &[MarketBar],
    windows: &WindowParams,
    top_n: u32,
) -> Vec<VolumeEntry> {
    let index = BarIndex::new(bars);
    log::debug!(
        "📊 Volume windows over {} tickers ({} bars)",
        index.ticker_count(),
        bars.len()
    );

    let mut excluded = 0usize;
    let candidates: Vec<VolumeEntry> = rankings
        .iter()
        .filter_map(|entry| {
            let stats = index.window_stats(
                &entry.ticker,
                entry.published_ts,
                windows.baseline_days,
                windows.post_minutes,
            );
            if stats.zero_baseline && windows.zero_baseline == ZeroBaselinePolicy::Exclude {
                excluded += 1;
                return None;
            }
            Some(VolumeEntry {
                relevance: entry.clone(),
                baseline_mean: stats.baseline_mean,
                baseline_std: stats.baseline_std,
                post_mean: stats.post_mean,
                volume_uplift: stats.volume_uplift,
                abn_volume_z: stats.abn_volume_z,
                rank_volume: 0,
            })
        })
        .collect();

    if excluded > 0 {
        log::info!("🚫 Excluded {} pairs with zero baseline volume", excluded);
    }

    let ranks = dense_rank_by_group(
        &candidates,
        |e| e.relevance.event_id.as_str(),
        |e| e.volume_uplift,
    );

    let mut entries: Vec<VolumeEntry> = candidates
        .into_iter()
        .zip(ranks)
        .filter(|(_, rank)| *rank <= top_n)
        .map(|(mut entry, rank)| {
            entry.rank_volume = rank;
            entry
        })
        .collect();

    entries.sort_by(|a, b| {
        a.relevance
            .event_id
            .cmp(&b.relevance.event_id)
            .then(a.rank_volume.cmp(&b.rank_volume))
            .then_with(|| {
                b.volume_uplift
                    .partial_cmp(&a.volume_uplift)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                b.abn_volume_z
                    .partial_cmp(&a.abn_volume_z)
                    .unwrap_or(Ordering::Equal)
            })
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::LinkFeatures;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap()
    }

    fn create_test_entry(event_id: &str, ticker: &str, published: Option<DateTime<Utc>>) -> RelevanceEntry {
        RelevanceEntry {
            event_id: event_id.to_string(),
            ticker: ticker.to_string(),
            relevance_score: 0.5,
            features: LinkFeatures::default(),
            published_ts: published,
            event_type: Some("policy".to_string()),
            base_signal: Some(0.1),
            salience: Some(0.3),
            novelty: Some(1),
            rank_relevance: 1,
        }
    }

    fn create_test_bars(ticker: &str, baseline: f64, post: f64) -> Vec<MarketBar> {
        vec![
            MarketBar {
                ticker: ticker.to_string(),
                ts: t0() - Duration::hours(1),
                volume: baseline,
                price: None,
            },
            MarketBar {
                ticker: ticker.to_string(),
                ts: t0() + Duration::minutes(10),
                volume: post,
                price: None,
            },
        ]
    }

    #[test]
    fn test_uplift_two_and_rank() {
        let rankings = vec![
            create_test_entry("e1", "005930", Some(t0())),
            create_test_entry("e1", "000660", Some(t0())),
        ];
        let mut bars = create_test_bars("005930", 1000.0, 3000.0);
        bars.extend(create_test_bars("000660", 1000.0, 1500.0));

        let entries = rank_by_volume(&rankings, &bars, &WindowParams::default(), 10);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].relevance.ticker, "005930");
        assert_eq!(entries[0].volume_uplift, 2.0);
        assert_eq!(entries[0].rank_volume, 1);
        assert_eq!(entries[1].volume_uplift, 0.5);
        assert_eq!(entries[1].rank_volume, 2);
    }

    #[test]
    fn test_null_timestamp_gives_zero_metrics() {
        let rankings = vec![create_test_entry("e1", "005930", None)];
        let bars = create_test_bars("005930", 1000.0, 3000.0);

        let entries = rank_by_volume(&rankings, &bars, &WindowParams::default(), 10);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].volume_uplift, 0.0);
        assert_eq!(entries[0].abn_volume_z, 0.0);
        assert_eq!(entries[0].rank_volume, 1);
    }

    #[test]
    fn test_zero_baseline_policy() {
        let rankings = vec![
            create_test_entry("e1", "NEW", Some(t0())),
            create_test_entry("e1", "OLD", Some(t0())),
        ];
        let mut bars = create_test_bars("OLD", 100.0, 200.0);
        bars.push(MarketBar {
            ticker: "NEW".to_string(),
            ts: t0(),
            volume: 50.0,
            price: None,
        });

        let epsilon = rank_by_volume(&rankings, &bars, &WindowParams::default(), 10);
        assert_eq!(epsilon.len(), 2);
        assert_eq!(epsilon[0].relevance.ticker, "NEW");
        assert!(epsilon[0].volume_uplift > 1e9);

        let windows = WindowParams {
            zero_baseline: ZeroBaselinePolicy::Exclude,
            ..WindowParams::default()
        };
        let excluded = rank_by_volume(&rankings, &bars, &windows, 10);
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].relevance.ticker, "OLD");
        assert_eq!(excluded[0].rank_volume, 1);
    }

    #[test]
    fn test_top_n_cut() {
        let rankings = vec![
            create_test_entry("e1", "A", Some(t0())),
            create_test_entry("e1", "B", Some(t0())),
            create_test_entry("e1", "C", Some(t0())),
        ];
        let mut bars = create_test_bars("A", 100.0, 300.0);
        bars.extend(create_test_bars("B", 100.0, 200.0));
        bars.extend(create_test_bars("C", 100.0, 100.0));

        let entries = rank_by_volume(&rankings, &bars, &WindowParams::default(), 2);
        let tickers: Vec<&str> = entries.iter().map(|e| e.relevance.ticker.as_str()).collect();

        assert_eq!(tickers, vec!["A", "B"]);
    }

    #[test]
    fn test_flattened_json_shape() {
        let entry = VolumeEntry {
            relevance: create_test_entry("e1", "A", None),
            baseline_mean: 0.0,
            baseline_std: 0.0,
            post_mean: 0.0,
            volume_uplift: 0.0,
            abn_volume_z: 0.0,
            rank_volume: 1,
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event_id"], "e1");
        assert_eq!(value["rank_relevance"], 1);
        assert_eq!(value["rank_volume"], 1);

        let back: VolumeEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
