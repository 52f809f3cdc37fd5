//! Per-stage snapshot persistence
//!
//! Routes writes to either the JSONL or the SQLite backend based on configuration.

pub mod backend;
pub mod jsonl_store;
pub mod sqlite_store;

pub use backend::{SnapshotBackend, SnapshotRecord, SnapshotRun, Stage};
pub use jsonl_store::JsonlSnapshotStore;
pub use sqlite_store::SqliteSnapshotStore;

use crate::config::{BackendType, RuntimeConfig};
use crate::error::Result;

/// Unified store that routes to either JSONL or SQLite backend
pub enum SnapshotStore {
    Jsonl(JsonlSnapshotStore),
    Sqlite(SqliteSnapshotStore),
}

impl SnapshotStore {
    /// Open the backend selected in `config`
    pub fn open(config: &RuntimeConfig) -> Result<Self> {
        match config.backend {
            BackendType::Jsonl => Ok(SnapshotStore::Jsonl(JsonlSnapshotStore::new(
                config.processed_dir(),
            )?)),
            BackendType::Sqlite => Ok(SnapshotStore::Sqlite(SqliteSnapshotStore::new(
                &config.db_path,
            )?)),
        }
    }
}

impl SnapshotBackend for SnapshotStore {
    fn write_snapshot<T: SnapshotRecord>(&mut self, rows: &[T]) -> Result<()> {
        match self {
            SnapshotStore::Jsonl(s) => s.write_snapshot(rows),
            SnapshotStore::Sqlite(s) => s.write_snapshot(rows),
        }
    }

    fn read_snapshot<T: SnapshotRecord>(&self) -> Result<Option<Vec<T>>> {
        match self {
            SnapshotStore::Jsonl(s) => s.read_snapshot(),
            SnapshotStore::Sqlite(s) => s.read_snapshot(),
        }
    }

    fn list_runs(&self) -> Result<Vec<SnapshotRun>> {
        match self {
            SnapshotStore::Jsonl(s) => s.list_runs(),
            SnapshotStore::Sqlite(s) => s.list_runs(),
        }
    }

    fn backend_type(&self) -> &'static str {
        match self {
            SnapshotStore::Jsonl(s) => s.backend_type(),
            SnapshotStore::Sqlite(s) => s.backend_type(),
        }
    }
}
