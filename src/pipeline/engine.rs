//! Pipeline Engine - stage orchestration over persisted snapshots
//!
//! Each stage reads its complete upstream snapshot from the store, recomputes,
//! and replaces its own snapshot. Stages run in a strict dependency order:
//!
//! ```text
//! raw/rss_*.csv    ──> normalize ──> score ──> mapping ──> rankings ──┐
//!                                                                    ├──> rankings_volume ──> signals
//! raw/market/*.csv ──> market ───────────────────────────────────────┘
//! ```
//!
//! A missing upstream snapshot skips the stage with a warning. An empty
//! result is still written, so downstream stages see an empty snapshot rather
//! than a stale one.

use super::stage::{PipelineStage, StageOutcome};
use crate::config::{PipelineParams, RuntimeConfig, SourcesConfig};
use crate::error::Result;
use crate::eventing::{normalize_events, Event, EventTaxonomy};
use crate::ingestion::{latest_raw_events_file, list_market_files, read_market_file, read_raw_events};
use crate::mapping::{link_entities, EntityLink};
use crate::market::{aggregate_bars, MarketBar};
use crate::ranking::{rank_by_relevance, rank_by_volume, RelevanceEntry, VolumeEntry};
use crate::scoring::score_events;
use crate::signal::{build_signals, Decision, Signal};
use crate::store::{SnapshotBackend, SnapshotRecord, SnapshotStore};
use chrono::{DateTime, Utc};

/// Pipeline engine driving every stage against one snapshot store
pub struct PipelineEngine {
    runtime: RuntimeConfig,
    params: PipelineParams,
    sources: SourcesConfig,
    taxonomy: EventTaxonomy,
    store: SnapshotStore,

    /// Clock used by confidence decay (for testing with fixed time)
    now_fn: Box<dyn Fn() -> DateTime<Utc>>,
}

impl PipelineEngine {
    pub fn new(
        runtime: RuntimeConfig,
        params: PipelineParams,
        sources: SourcesConfig,
        store: SnapshotStore,
    ) -> Self {
        let taxonomy = EventTaxonomy::with_overrides(&params.rules.event_types);
        Self {
            runtime,
            params,
            sources,
            taxonomy,
            store,
            now_fn: Box::new(Utc::now),
        }
    }

    /// Load params and aliases from the configured paths and open the store
    pub fn from_runtime(runtime: RuntimeConfig) -> Result<Self> {
        let params = PipelineParams::load(&runtime.params_path)?;
        let sources = SourcesConfig::load(&runtime.sources_path)?;
        let store = SnapshotStore::open(&runtime)?;
        Ok(Self::new(runtime, params, sources, store))
    }

    /// Replace the clock
    ///
    /// Used for testing with deterministic timestamps.
    pub fn with_clock(mut self, now_fn: Box<dyn Fn() -> DateTime<Utc>>) -> Self {
        self.now_fn = now_fn;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run every stage in dependency order, continuing past skipped ones
    pub fn run_all(&mut self) -> Result<Vec<(PipelineStage, StageOutcome)>> {
        log::info!(
            "🚀 Running pipeline ({} backend, data dir {})",
            self.store.backend_type(),
            self.runtime.data_dir.display()
        );

        let mut outcomes = Vec::with_capacity(PipelineStage::all().len());
        for stage in PipelineStage::all() {
            let outcome = self.run_stage(stage)?;
            outcomes.push((stage, outcome));
        }

        let written = outcomes.iter().filter(|(_, o)| o.is_written()).count();
        log::info!("🏁 Pipeline finished: {}/{} stages written", written, outcomes.len());
        Ok(outcomes)
    }

    pub fn run_stage(&mut self, stage: PipelineStage) -> Result<StageOutcome> {
        let outcome = match stage {
            PipelineStage::Normalize => self.normalize()?,
            PipelineStage::Score => self.score()?,
            PipelineStage::Market => self.market()?,
            PipelineStage::Mapping => self.mapping()?,
            PipelineStage::Rankings => self.rankings()?,
            PipelineStage::RankingsVolume => self.rankings_volume()?,
            PipelineStage::Signals => self.signals()?,
        };

        match &outcome {
            StageOutcome::Written { rows } => {
                log::info!("✅ {} -> {} ({} rows)", stage, stage.output(), rows)
            }
            StageOutcome::Skipped { reason } => log::warn!("⚠️  {} skipped: {}", stage, reason),
        }
        Ok(outcome)
    }

    fn write<T: SnapshotRecord>(&mut self, rows: &[T]) -> Result<StageOutcome> {
        if rows.is_empty() {
            log::info!("ℹ️  {} snapshot is empty", T::STAGE);
        }
        self.store.write_snapshot(rows)?;
        Ok(StageOutcome::Written { rows: rows.len() })
    }

    fn normalize(&mut self) -> Result<StageOutcome> {
        let raw_dir = self.runtime.raw_dir();
        let Some(path) = latest_raw_events_file(&raw_dir)? else {
            return Ok(StageOutcome::skipped(format!(
                "no rss_*.csv under {}",
                raw_dir.display()
            )));
        };

        let records = read_raw_events(&path)?;
        let events = normalize_events(&records, &self.taxonomy);
        self.write(&events)
    }

    fn score(&mut self) -> Result<StageOutcome> {
        let Some(mut events) = self.store.read_snapshot::<Event>()? else {
            return Ok(StageOutcome::skipped("events snapshot missing"));
        };

        let now = (self.now_fn)();
        score_events(&mut events, &self.params.weights, now);
        self.write(&events)
    }

    fn market(&mut self) -> Result<StageOutcome> {
        let market_dir = self.runtime.market_raw_dir();
        let files = list_market_files(&market_dir)?;
        if files.is_empty() {
            return Ok(StageOutcome::skipped(format!(
                "no *.csv under {}",
                market_dir.display()
            )));
        }

        let mut ticks = Vec::new();
        let mut loaded = 0usize;
        for path in &files {
            match read_market_file(path) {
                Ok(file_ticks) => {
                    log::info!("📥 {} loaded ({} rows)", path.display(), file_ticks.len());
                    ticks.extend(file_ticks);
                    loaded += 1;
                }
                Err(e) => log::error!("❌ Skipping {}: {}", path.display(), e),
            }
        }

        if loaded == 0 {
            return Ok(StageOutcome::skipped("no readable market file"));
        }

        let bars = aggregate_bars(&ticks);
        self.write(&bars)
    }

    fn mapping(&mut self) -> Result<StageOutcome> {
        let Some(events) = self.store.read_snapshot::<Event>()? else {
            return Ok(StageOutcome::skipped("events snapshot missing"));
        };

        let links = link_entities(&events, &self.sources, &self.params.weights.relevance);
        self.write(&links)
    }

    fn rankings(&mut self) -> Result<StageOutcome> {
        let Some(links) = self.store.read_snapshot::<EntityLink>()? else {
            return Ok(StageOutcome::skipped("mapping snapshot missing"));
        };
        let Some(events) = self.store.read_snapshot::<Event>()? else {
            return Ok(StageOutcome::skipped("events snapshot missing"));
        };

        let entries = rank_by_relevance(&links, &events, self.params.topn.relevance);
        self.write(&entries)
    }

    fn rankings_volume(&mut self) -> Result<StageOutcome> {
        let Some(rankings) = self.store.read_snapshot::<RelevanceEntry>()? else {
            return Ok(StageOutcome::skipped("rankings snapshot missing"));
        };
        let Some(bars) = self.store.read_snapshot::<MarketBar>()? else {
            return Ok(StageOutcome::skipped("market snapshot missing"));
        };

        let entries = rank_by_volume(
            &rankings,
            &bars,
            &self.params.windows,
            self.params.topn.volume,
        );
        self.write(&entries)
    }

    fn signals(&mut self) -> Result<StageOutcome> {
        let Some(events) = self.store.read_snapshot::<Event>()? else {
            return Ok(StageOutcome::skipped("events snapshot missing"));
        };
        let Some(relevance) = self.store.read_snapshot::<RelevanceEntry>()? else {
            return Ok(StageOutcome::skipped("rankings snapshot missing"));
        };
        let Some(volume) = self.store.read_snapshot::<VolumeEntry>()? else {
            return Ok(StageOutcome::skipped("rankings_volume snapshot missing"));
        };

        let signals = build_signals(&events, &relevance, &volume, &self.params);
        log_decision_summary(&signals);
        self.write(&signals)
    }
}

fn log_decision_summary(signals: &[Signal]) {
    let count = |d: Decision| signals.iter().filter(|s| s.decision == d).count();
    log::info!(
        "🎯 Decisions: {} buy, {} watch, {} exclude",
        count(Decision::Buy),
        count(Decision::Watch),
        count(Decision::Exclude)
    );
}
