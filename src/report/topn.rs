//! Per-event top-N report over fused signals, on both ranking axes

use super::master::{pad_ticker, TickerMaster};
use crate::error::Result;
use crate::ranking::dense_rank_by_group;
use crate::signal::{Decision, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopNAxis {
    Relevance,
    Volume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopNRow {
    pub event_id: String,
    pub signal_type: TopNAxis,
    pub rank: u32,
    pub ticker: String,
    pub name: Option<String>,
    pub buy_score: f64,
    pub decision: Decision,
    pub relevance_score: Option<f64>,
    pub volume_uplift: f64,
    pub event_type: String,
    pub published_ts: Option<DateTime<Utc>>,
    pub title: String,
}

fn to_row(signal: &Signal, axis: TopNAxis, rank: u32, master: &TickerMaster) -> TopNRow {
    let ticker = pad_ticker(&signal.ticker);
    TopNRow {
        event_id: signal.event_id.clone(),
        signal_type: axis,
        rank,
        name: master.name_of(&ticker).map(str::to_string),
        ticker,
        buy_score: signal.buy_score,
        decision: signal.decision,
        relevance_score: signal.relevance_score,
        volume_uplift: signal.volume_uplift,
        event_type: signal.event_type.clone(),
        published_ts: signal.published_ts,
        title: signal.title.clone(),
    }
}

/// Dense-rank signals per event by relevance and by uplift, keeping `rank <= top_n`
///
/// A signal can appear once per axis. Signals without a relevance score only
/// take part in the volume axis.
pub fn select_topn(signals: &[Signal], master: &TickerMaster, top_n: u32) -> Vec<TopNRow> {
    let mut rows = Vec::new();

    let with_relevance: Vec<&Signal> = signals
        .iter()
        .filter(|s| s.relevance_score.is_some())
        .collect();
    let relevance_ranks = dense_rank_by_group(
        &with_relevance,
        |s| s.event_id.as_str(),
        |s| s.relevance_score.unwrap_or(0.0),
    );
    for (signal, rank) in with_relevance.iter().zip(relevance_ranks) {
        if rank <= top_n {
            rows.push(to_row(signal, TopNAxis::Relevance, rank, master));
        }
    }

    let volume_ranks = dense_rank_by_group(signals, |s| s.event_id.as_str(), |s| s.volume_uplift);
    for (signal, rank) in signals.iter().zip(volume_ranks) {
        if rank <= top_n {
            rows.push(to_row(signal, TopNAxis::Volume, rank, master));
        }
    }

    let unnamed = rows.iter().filter(|r| r.name.is_none()).count();
    if unnamed > 0 && !master.is_empty() {
        log::warn!("⚠️  {} report rows have no ticker name in the master", unnamed);
    }

    rows.sort_by(|a, b| {
        a.event_id
            .cmp(&b.event_id)
            .then(a.signal_type.cmp(&b.signal_type))
            .then(a.rank.cmp(&b.rank))
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    rows
}

pub fn export_csv(rows: &[TopNRow], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("✅ Report written: {} ({} rows)", path.display(), rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_signal(event_id: &str, ticker: &str, relevance: Option<f64>, uplift: f64) -> Signal {
        Signal {
            event_id: event_id.to_string(),
            ticker: ticker.to_string(),
            buy_score: 0.6,
            decision: Decision::Watch,
            reason: String::new(),
            base_signal: 0.1,
            base_signal_norm: 0.55,
            rel_score: 1.0,
            vol_score: 0.0,
            mix_term: 0.0,
            rank_relevance: Some(1),
            relevance_score: relevance,
            rank_volume: None,
            volume_uplift: uplift,
            abn_volume_z: 0.0,
            event_type: "policy".to_string(),
            published_ts: None,
            title: "t".to_string(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_select_topn_both_axes() {
        let signals = vec![
            create_test_signal("e1", "5930", Some(0.9), 0.1),
            create_test_signal("e1", "000660", Some(0.4), 2.0),
            create_test_signal("e1", "035420", None, 1.0),
        ];
        let master = TickerMaster::from_pairs([("005930", "삼성전자"), ("000660", "SK하이닉스")]);

        let rows = select_topn(&signals, &master, 1);
        let keys: Vec<(TopNAxis, &str, u32)> = rows
            .iter()
            .map(|r| (r.signal_type, r.ticker.as_str(), r.rank))
            .collect();

        assert_eq!(
            keys,
            vec![
                (TopNAxis::Relevance, "005930", 1),
                (TopNAxis::Volume, "000660", 1),
            ]
        );
        assert_eq!(rows[0].name.as_deref(), Some("삼성전자"));
        assert_eq!(rows[1].name.as_deref(), Some("SK하이닉스"));
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("final_signals.csv");
        let signals = vec![create_test_signal("e1", "005930", Some(0.5), 0.0)];

        let rows = select_topn(&signals, &TickerMaster::default(), 5);
        export_csv(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("event_id,signal_type,rank,ticker,name"));
        assert!(lines.next().unwrap().starts_with("e1,relevance,1,005930,,"));
        assert_eq!(lines.count(), 1);
    }
}
