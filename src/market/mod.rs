//! Market aggregation: raw ticks -> per-minute volume bars

pub mod aggregator;
pub mod types;

pub use aggregator::{aggregate_bars, normalize_ticker};
pub use types::{MarketBar, RawTick};
