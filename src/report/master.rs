//! Local ticker master (ticker -> display name)

use crate::columns::{field, read_lossy};
use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::path::Path;

const NAME_CANDIDATES: [&str; 5] = ["name", "종목명", "한글 종목명", "한글명", "표준종목명"];
const TICKER_CANDIDATES: [&str; 4] = ["ticker", "단축코드", "종목코드", "단축 종목코드"];

/// Left-pad all-digit tickers with zeros to six characters
pub fn pad_ticker(ticker: &str) -> String {
    let ticker = ticker.trim();
    if !ticker.is_empty() && ticker.len() < 6 && ticker.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>6}", ticker)
    } else {
        ticker.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TickerMaster {
    names: HashMap<String, String>,
}

impl TickerMaster {
    /// Load from CSV; a missing file gives an empty master
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("⚠️  Ticker master not found at {}, names left empty", path.display());
            return Ok(Self::default());
        }

        let (resolver, rows) = read_lossy(path)?;

        let (name_idx, ticker_idx) = match (
            resolver.find(&NAME_CANDIDATES),
            resolver.find(&TICKER_CANDIDATES),
        ) {
            (Some(n), Some(t)) => (n, t),
            (name, ticker) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("name".to_string());
                }
                if ticker.is_none() {
                    missing.push("ticker".to_string());
                }
                return Err(PipelineError::MissingColumns {
                    file: path.display().to_string(),
                    missing,
                });
            }
        };

        let mut names = HashMap::new();
        for record in &rows {
            let ticker = pad_ticker(field(record, ticker_idx));
            if ticker.is_empty() {
                continue;
            }
            names
                .entry(ticker)
                .or_insert_with(|| field(record, name_idx).to_string());
        }

        log::info!("📥 Loaded ticker master: {} tickers", names.len());
        Ok(Self { names })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut names = HashMap::new();
        for (ticker, name) in pairs {
            names.entry(pad_ticker(ticker.as_ref())).or_insert_with(|| name.into());
        }
        Self { names }
    }

    pub fn name_of(&self, ticker: &str) -> Option<&str> {
        self.names.get(&pad_ticker(ticker)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
