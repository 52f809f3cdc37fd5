//! Per-minute volume bars from raw ticks

use super::types::{MarketBar, RawTick};
use crate::timeparse::{floor_to_minute, parse_market_ts};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Trimmed, upper-cased ticker symbol
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Sum ticks into one bar per (ticker, minute)
///
/// Ticks with unparsable timestamps or an empty ticker are dropped, and negative
/// volumes count as 0. The bar keeps the last price observed in its minute.
/// Output is ordered by (ticker, ts).
pub fn aggregate_bars<'a>(ticks: impl IntoIterator<Item = &'a RawTick>) -> Vec<MarketBar> {
    let mut bars: BTreeMap<(String, DateTime<Utc>), (f64, Option<f64>)> = BTreeMap::new();
    let mut dropped = 0usize;
    let mut negative = 0usize;

    for tick in ticks {
        let ticker = normalize_ticker(&tick.ticker);
        let ts = match parse_market_ts(&tick.ts_text) {
            Some(ts) if !ticker.is_empty() => floor_to_minute(ts),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let volume = if tick.volume.is_finite() && tick.volume > 0.0 {
            tick.volume
        } else {
            if tick.volume < 0.0 {
                negative += 1;
            }
            0.0
        };
        let entry = bars.entry((ticker, ts)).or_insert((0.0, None));
        entry.0 += volume;
        if tick.price.is_some() {
            entry.1 = tick.price;
        }
    }

    if dropped > 0 {
        log::warn!("⚠️  Dropped {} ticks with unparsable timestamp or empty ticker", dropped);
    }

    if negative > 0 {
        log::warn!("⚠️  Clamped {} negative tick volumes to 0", negative);
    }

    bars.into_iter()
        .map(|((ticker, ts), (volume, price))| MarketBar {
            ticker,
            ts,
            volume,
            price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_tick(ticker: &str, ts: &str, volume: f64, price: Option<f64>) -> RawTick {
        RawTick {
            ticker: ticker.to_string(),
            ts_text: ts.to_string(),
            volume,
            price,
        }
    }

    #[test]
    fn test_sums_same_ticker_minute() {
        let ticks = vec![
            create_test_tick(" 005930 ", "2024-01-02 09:00:05", 100.0, Some(70000.0)),
            create_test_tick("005930", "2024-01-02 09:00:55", 50.0, Some(70100.0)),
            create_test_tick("005930", "2024-01-02 09:01:00", 10.0, None),
        ];

        let bars = aggregate_bars(&ticks);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].ticker, "005930");
        // 09:00 Seoul == 00:00 UTC
        assert_eq!(bars[0].ts, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(bars[0].volume, 150.0);
        assert_eq!(bars[0].price, Some(70100.0));
        assert_eq!(bars[1].volume, 10.0);
        assert_eq!(bars[1].price, None);
    }

    #[test]
    fn test_ticker_case_is_normalized() {
        let ticks = vec![
            create_test_tick("aapl", "2024-01-02T14:30:00Z", 1.0, None),
            create_test_tick("AAPL ", "2024-01-02T14:30:30Z", 2.0, None),
        ];

        let bars = aggregate_bars(&ticks);

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].ticker, "AAPL");
        assert_eq!(bars[0].volume, 3.0);
    }

    #[test]
    fn test_unparsable_rows_dropped() {
        let ticks = vec![
            create_test_tick("A", "not a time", 1.0, None),
            create_test_tick("", "2024-01-02 09:00:00", 1.0, None),
            create_test_tick("B", "2024-01-02 09:00:00", 1.0, None),
        ];

        let bars = aggregate_bars(&ticks);

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].ticker, "B");
    }

    #[test]
    fn test_sorted_by_ticker_then_ts() {
        let ticks = vec![
            create_test_tick("B", "2024-01-02 09:05:00", 1.0, None),
            create_test_tick("A", "2024-01-02 09:10:00", 1.0, None),
            create_test_tick("A", "2024-01-02 09:00:00", 1.0, None),
        ];

        let bars = aggregate_bars(&ticks);
        let keys: Vec<(&str, u32)> = bars
            .iter()
            .map(|b| (b.ticker.as_str(), chrono::Timelike::minute(&b.ts)))
            .collect();

        assert_eq!(keys, vec![("A", 0), ("A", 10), ("B", 5)]);
    }

    #[test]
    fn test_negative_volume_clamped_to_zero() {
        let ticks = vec![
            create_test_tick("A", "2024-01-02 09:00:05", -500.0, None),
            create_test_tick("A", "2024-01-02 09:00:40", 20.0, None),
            create_test_tick("B", "2024-01-02 09:00:05", -1.0, Some(10.0)),
        ];

        let bars = aggregate_bars(&ticks);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].volume, 20.0);
        assert_eq!(bars[1].volume, 0.0);
        assert!(bars.iter().all(|b| b.volume >= 0.0));
    }
}
