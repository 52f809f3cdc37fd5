//! Snapshot backend trait
//!
//! Defines the interface for persisting one stage's complete output. A write
//! replaces the previous snapshot atomically; readers never observe a partial one.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Persisted snapshot names, in pipeline dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Events,
    Market,
    Mapping,
    Rankings,
    RankingsVolume,
    Signals,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Events => "events",
            Stage::Market => "market",
            Stage::Mapping => "mapping",
            Stage::Rankings => "rankings",
            Stage::RankingsVolume => "rankings_volume",
            Stage::Signals => "signals",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|stage| stage.as_str() == s)
    }

    pub fn all() -> [Stage; 6] {
        [
            Stage::Events,
            Stage::Market,
            Stage::Mapping,
            Stage::Rankings,
            Stage::RankingsVolume,
            Stage::Signals,
        ]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type that lives in exactly one stage snapshot
pub trait SnapshotRecord: Serialize + DeserializeOwned {
    const STAGE: Stage;
}

/// One entry of the append-only run ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRun {
    pub stage: Stage,
    pub row_count: usize,
    /// Unix timestamp (seconds)
    pub written_at: i64,
}

pub trait SnapshotBackend {
    /// Replace the snapshot for `T::STAGE` with `rows`, and append a ledger entry
    fn write_snapshot<T: SnapshotRecord>(&mut self, rows: &[T]) -> Result<()>;

    /// Read the snapshot for `T::STAGE`; `None` when it was never written
    fn read_snapshot<T: SnapshotRecord>(&self) -> Result<Option<Vec<T>>>;

    /// Ledger entries, oldest first
    fn list_runs(&self) -> Result<Vec<SnapshotRun>>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
