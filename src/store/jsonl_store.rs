//! JSONL snapshot store - one `<stage>.jsonl` file per stage
//!
//! Writes go to `<stage>.jsonl.tmp` first and are renamed over the live file, so a
//! reader sees either the previous snapshot or the new one.

use super::backend::{SnapshotBackend, SnapshotRecord, SnapshotRun};
use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const RUNS_FILE: &str = "runs.jsonl";

pub struct JsonlSnapshotStore {
    dir: PathBuf,
}

impl JsonlSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("📝 Writing snapshots to: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn snapshot_path(&self, stage_name: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", stage_name))
    }

    fn append_run(&self, run: &SnapshotRun) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(RUNS_FILE))?;
        writeln!(file, "{}", serde_json::to_string(run)?)?;
        Ok(())
    }
}

fn read_lines<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}

impl SnapshotBackend for JsonlSnapshotStore {
    fn write_snapshot<T: SnapshotRecord>(&mut self, rows: &[T]) -> Result<()> {
        let path = self.snapshot_path(T::STAGE.as_str());
        let tmp_path = path.with_extension("jsonl.tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for row in rows {
                writeln!(writer, "{}", serde_json::to_string(row)?)?;
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;

        self.append_run(&SnapshotRun {
            stage: T::STAGE,
            row_count: rows.len(),
            written_at: chrono::Utc::now().timestamp(),
        })?;

        log::debug!("✅ {} snapshot written: {} rows", T::STAGE, rows.len());
        Ok(())
    }

    fn read_snapshot<T: SnapshotRecord>(&self) -> Result<Option<Vec<T>>> {
        let path = self.snapshot_path(T::STAGE.as_str());
        if !path.exists() {
            return Ok(None);
        }
        read_lines(&path).map(Some)
    }

    fn list_runs(&self) -> Result<Vec<SnapshotRun>> {
        let path = self.dir.join(RUNS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_lines(&path)
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
