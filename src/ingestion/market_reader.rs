//! Raw market tick files (`market/*.csv`) with heterogeneous headers

use crate::columns::{field, read_lossy, ColumnResolver};
use crate::error::{PipelineError, Result};
use crate::market::RawTick;
use std::fs;
use std::path::{Path, PathBuf};

const TICKER_CANDIDATES: [&str; 4] = ["ticker", "symbol", "종목코드", "코드"];
const TS_CANDIDATES: [&str; 8] = [
    "ts", "timestamp", "datetime", "time", "거래시각", "체결시각", "일시", "날짜시간",
];
const DATE_CANDIDATES: [&str; 3] = ["date", "날짜", "일자"];
const TIME_CANDIDATES: [&str; 3] = ["time", "시간", "시각"];
const VOLUME_CANDIDATES: [&str; 3] = ["volume", "거래량", "체결량"];
const PRICE_CANDIDATES: [&str; 5] = ["price", "close", "체결가", "종가", "현재가"];

/// Where the timestamp of a row comes from
enum TimestampColumn {
    Single(usize),
    DateTime { date: usize, time: usize },
}

struct MarketColumns {
    ticker: usize,
    ts: TimestampColumn,
    volume: usize,
    price: Option<usize>,
}

impl MarketColumns {
    fn resolve(resolver: &ColumnResolver, file: &Path) -> Result<Self> {
        let ticker = resolver.find(&TICKER_CANDIDATES);
        // date+time pair takes precedence over a bare `time` header
        let ts = match (resolver.find(&DATE_CANDIDATES), resolver.find(&TIME_CANDIDATES)) {
            (Some(date), Some(time)) if date != time => Some(TimestampColumn::DateTime { date, time }),
            _ => resolver.find(&TS_CANDIDATES).map(TimestampColumn::Single),
        };
        let volume = resolver.find(&VOLUME_CANDIDATES);

        match (ticker, ts, volume) {
            (Some(ticker), Some(ts), Some(volume)) => Ok(Self {
                ticker,
                ts,
                volume,
                price: resolver.find(&PRICE_CANDIDATES),
            }),
            (ticker, ts, volume) => {
                let mut missing = Vec::new();
                if ticker.is_none() {
                    missing.push(format!("ticker ({})", TICKER_CANDIDATES.join("/")));
                }
                if ts.is_none() {
                    missing.push(format!("ts ({} or date+time)", TS_CANDIDATES.join("/")));
                }
                if volume.is_none() {
                    missing.push(format!("volume ({})", VOLUME_CANDIDATES.join("/")));
                }
                Err(PipelineError::MissingColumns {
                    file: file.display().to_string(),
                    missing,
                })
            }
        }
    }
}

/// Lenient numeric parse: thousands separators allowed, failure is `None`
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Every `*.csv` under `dir`, sorted by name
pub fn list_market_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map(|e| e == "csv").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Resolve columns and read typed ticks
///
/// Volume that fails to parse becomes 0 and price becomes `None`, including
/// cells that are not valid UTF-8. A file missing a required column fails as a
/// whole with [`PipelineError::MissingColumns`].
pub fn read_market_file(path: impl AsRef<Path>) -> Result<Vec<RawTick>> {
    let path = path.as_ref();
    let (resolver, rows) = read_lossy(path)?;
    let columns = MarketColumns::resolve(&resolver, path)?;

    let mut ticks = Vec::with_capacity(rows.len());
    for record in &rows {
        let ts_text = match columns.ts {
            TimestampColumn::Single(i) => field(record, i).to_string(),
            TimestampColumn::DateTime { date, time } => {
                format!("{} {}", field(record, date), field(record, time))
            }
        };
        ticks.push(RawTick {
            ticker: field(record, columns.ticker).to_string(),
            ts_text,
            volume: parse_number(field(record, columns.volume)).unwrap_or(0.0),
            price: columns.price.and_then(|i| parse_number(field(record, i))),
        });
    }
    Ok(ticks)
}
