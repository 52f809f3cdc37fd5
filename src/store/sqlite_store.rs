//! SQLite snapshot store
//!
//! One table per stage, `snapshot_<stage>(seq, payload)`, holding each row as a
//! JSON payload in write order. A write deletes and re-inserts inside a single
//! transaction together with its `snapshot_runs` ledger row.

use super::backend::{SnapshotBackend, SnapshotRecord, SnapshotRun, Stage};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteSnapshotStore {
    conn: Connection,
}

impl SqliteSnapshotStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self { conn };
        store.init_schema()?;

        log::info!("✅ SQLite snapshot store initialized: {}", db_path.display());
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        for stage in Stage::all() {
            self.conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    seq INTEGER PRIMARY KEY,
                    payload TEXT NOT NULL
                );",
                table_name(stage)
            ))?;
        }

        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshot_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stage TEXT NOT NULL,
                row_count INTEGER NOT NULL,
                written_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_snapshot_runs_stage ON snapshot_runs(stage);",
        )?;
        Ok(())
    }

    fn has_run(&self, stage: Stage) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM snapshot_runs WHERE stage = ?1 LIMIT 1",
                params![stage.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn table_name(stage: Stage) -> String {
    format!("snapshot_{}", stage.as_str())
}

impl SnapshotBackend for SqliteSnapshotStore {
    fn write_snapshot<T: SnapshotRecord>(&mut self, rows: &[T]) -> Result<()> {
        let table = table_name(T::STAGE);
        let tx = self.conn.transaction()?;

        tx.execute(&format!("DELETE FROM {}", table), [])?;
        {
            let mut stmt =
                tx.prepare(&format!("INSERT INTO {} (seq, payload) VALUES (?1, ?2)", table))?;
            for (seq, row) in rows.iter().enumerate() {
                stmt.execute(params![seq as i64, serde_json::to_string(row)?])?;
            }
        }
        tx.execute(
            "INSERT INTO snapshot_runs (stage, row_count, written_at) VALUES (?1, ?2, ?3)",
            params![
                T::STAGE.as_str(),
                rows.len() as i64,
                chrono::Utc::now().timestamp()
            ],
        )?;
        tx.commit()?;

        log::debug!("✅ {} snapshot written: {} rows", T::STAGE, rows.len());
        Ok(())
    }

    fn read_snapshot<T: SnapshotRecord>(&self) -> Result<Option<Vec<T>>> {
        if !self.has_run(T::STAGE)? {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT payload FROM {} ORDER BY seq",
            table_name(T::STAGE)
        ))?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(payloads.len());
        for payload in payloads {
            rows.push(serde_json::from_str(&payload)?);
        }
        Ok(Some(rows))
    }

    fn list_runs(&self) -> Result<Vec<SnapshotRun>> {
        let mut stmt = self
            .conn
            .prepare("SELECT stage, row_count, written_at FROM snapshot_runs ORDER BY id")?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(raw
            .into_iter()
            .filter_map(|(stage, row_count, written_at)| {
                let stage = Stage::parse(&stage)?;
                Some(SnapshotRun {
                    stage,
                    row_count: row_count.max(0) as usize,
                    written_at,
                })
            })
            .collect())
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
