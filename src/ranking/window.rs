//! Baseline vs post-event volume statistics around an event time

use crate::market::{normalize_ticker, MarketBar};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};

/// Guard divisor for zero baseline mean/std
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeWindowStats {
    pub baseline_mean: f64,
    pub baseline_std: f64,
    pub post_mean: f64,
    pub volume_uplift: f64,
    pub abn_volume_z: f64,
    /// The window held bars but none before the event
    pub zero_baseline: bool,
}

/// Bars indexed per ticker by time, for window range queries
pub struct BarIndex {
    by_ticker: HashMap<String, BTreeMap<DateTime<Utc>, f64>>,
}

impl BarIndex {
    pub fn new(bars: &[MarketBar]) -> Self {
        let mut by_ticker: HashMap<String, BTreeMap<DateTime<Utc>, f64>> = HashMap::new();
        for bar in bars {
            *by_ticker
                .entry(normalize_ticker(&bar.ticker))
                .or_default()
                .entry(bar.ts)
                .or_insert(0.0) += bar.volume;
        }
        Self { by_ticker }
    }

    pub fn ticker_count(&self) -> usize {
        self.by_ticker.len()
    }

    /// Stats over `[t0 - baseline_days, t0 + post_minutes)`
    ///
    /// A missing `t0`, an empty window, or bounds outside the representable
    /// time range yield all zeros.
    pub fn window_stats(
        &self,
        ticker: &str,
        t0: Option<DateTime<Utc>>,
        baseline_days: i64,
        post_minutes: i64,
    ) -> VolumeWindowStats {
        let (Some(t0), Some(series)) = (t0, self.by_ticker.get(&normalize_ticker(ticker))) else {
            return VolumeWindowStats::default();
        };

        let bounds = Duration::try_days(baseline_days)
            .zip(Duration::try_minutes(post_minutes))
            .and_then(|(baseline, post)| {
                Some((t0.checked_sub_signed(baseline)?, t0.checked_add_signed(post)?))
            });
        let Some((start, end)) = bounds else {
            log::warn!(
                "⚠️  Window of {} days / {} minutes around {} is out of range",
                baseline_days,
                post_minutes,
                t0
            );
            return VolumeWindowStats::default();
        };
        if start >= end {
            return VolumeWindowStats::default();
        }

        let baseline: Vec<f64> = series.range(start..t0).map(|(_, v)| *v).collect();
        let post: Vec<f64> = series.range(t0..end).map(|(_, v)| *v).collect();
        if baseline.is_empty() && post.is_empty() {
            return VolumeWindowStats::default();
        }

        let baseline_mean = mean(&baseline);
        let baseline_std = sample_std(&baseline);
        let post_mean = mean(&post);
        let delta = post_mean - baseline_mean;

        VolumeWindowStats {
            baseline_mean,
            baseline_std,
            post_mean,
            volume_uplift: delta / guard(baseline_mean),
            abn_volume_z: delta / guard(baseline_std),
            zero_baseline: baseline_mean <= 0.0,
        }
    }
}

fn guard(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        EPSILON
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with one degree of freedom; zero for fewer than two samples
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
