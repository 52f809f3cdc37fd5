//! Top-N report over the `signals` snapshot
//!
//! Ranks each event's signals by relevance and by volume uplift, attaches
//! display names from the local ticker master, and writes
//! `<data>/processed/final_signals.csv`.

use clap::Parser;
use dotenv::dotenv;
use log::{info, warn};
use newsflow::config::{BackendType, PipelineParams, RuntimeConfig};
use newsflow::report::{export_csv, select_topn, TickerMaster};
use newsflow::signal::Signal;
use newsflow::store::{SnapshotBackend, SnapshotStore};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "signals_report", about = "Top-N signals report with ticker names")]
struct Args {
    /// Snapshot backend (overrides NEWSFLOW_BACKEND)
    #[arg(long, value_parser = parse_backend)]
    backend: Option<BackendType>,

    /// Rows kept per event and axis (default: topn.relevance from params)
    #[arg(long)]
    top_n: Option<u32>,

    /// Output CSV (default: <data>/processed/final_signals.csv)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_backend(s: &str) -> Result<BackendType, String> {
    BackendType::parse(s).ok_or_else(|| format!("unknown backend '{}' (jsonl|sqlite)", s))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    let mut runtime = RuntimeConfig::from_env();
    if let Some(backend) = args.backend {
        runtime.backend = backend;
    }

    let params = PipelineParams::load(&runtime.params_path)?;
    let top_n = args.top_n.unwrap_or(params.topn.relevance).max(1);
    let output = args
        .output
        .unwrap_or_else(|| runtime.processed_dir().join("final_signals.csv"));

    let store = SnapshotStore::open(&runtime)?;
    let Some(signals) = store.read_snapshot::<Signal>()? else {
        warn!("⚠️  No signals snapshot yet; run `newsflow --all` first");
        return Ok(());
    };

    let master = TickerMaster::from_csv(&runtime.ticker_master_path)?;
    info!(
        "📊 {} signals, {} master names, top {} per event",
        signals.len(),
        master.len(),
        top_n
    );

    let rows = select_topn(&signals, &master, top_n);
    export_csv(&rows, &output)?;
    Ok(())
}
