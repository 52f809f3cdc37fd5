//! Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;

/// Snapshot persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Jsonl,
    Sqlite,
}

impl BackendType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "jsonl" => Some(BackendType::Jsonl),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Jsonl => "jsonl",
            BackendType::Sqlite => "sqlite",
        }
    }
}

/// Paths and backend selection for one pipeline process
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Root data directory (`raw/` inputs, `processed/` snapshots)
    pub data_dir: PathBuf,

    /// Tunable parameters YAML
    pub params_path: PathBuf,

    /// Alias dictionary YAML
    pub sources_path: PathBuf,

    /// Snapshot backend
    pub backend: BackendType,

    /// SQLite database file (sqlite backend only)
    pub db_path: PathBuf,

    /// Local ticker master CSV for report enrichment
    pub ticker_master_path: PathBuf,
}

impl RuntimeConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `NEWSFLOW_DATA_DIR` (default: data)
    /// - `NEWSFLOW_PARAMS_PATH` (default: configs/params.yaml)
    /// - `NEWSFLOW_SOURCES_PATH` (default: configs/sources.yaml)
    /// - `NEWSFLOW_BACKEND` (default: jsonl)
    /// - `NEWSFLOW_DB_PATH` (default: <data>/processed/newsflow.db)
    /// - `NEWSFLOW_TICKER_MASTER` (default: <data>/krx/krx_master.csv)
    pub fn from_env() -> Self {
        let data_dir: PathBuf = env::var("NEWSFLOW_DATA_DIR")
            .unwrap_or_else(|_| "data".to_string())
            .into();

        let backend = match env::var("NEWSFLOW_BACKEND") {
            Ok(raw) => BackendType::parse(&raw).unwrap_or_else(|| {
                log::warn!("Invalid NEWSFLOW_BACKEND '{}', defaulting to jsonl", raw);
                BackendType::Jsonl
            }),
            Err(_) => BackendType::Jsonl,
        };

        let mut config = Self::with_data_dir(data_dir);
        config.backend = backend;

        if let Ok(p) = env::var("NEWSFLOW_PARAMS_PATH") {
            config.params_path = p.into();
        }
        if let Ok(p) = env::var("NEWSFLOW_SOURCES_PATH") {
            config.sources_path = p.into();
        }
        if let Ok(p) = env::var("NEWSFLOW_DB_PATH") {
            config.db_path = p.into();
        }
        if let Ok(p) = env::var("NEWSFLOW_TICKER_MASTER") {
            config.ticker_master_path = p.into();
        }

        config
    }

    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            params_path: PathBuf::from("configs/params.yaml"),
            sources_path: PathBuf::from("configs/sources.yaml"),
            backend: BackendType::Jsonl,
            db_path: data_dir.join("processed").join("newsflow.db"),
            ticker_master_path: data_dir.join("krx").join("krx_master.csv"),
            data_dir,
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn market_raw_dir(&self) -> PathBuf {
        self.raw_dir().join("market")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config() {
        // Test: defaults, then overrides from env vars (single test to avoid env races)
        env::remove_var("NEWSFLOW_DATA_DIR");
        env::remove_var("NEWSFLOW_BACKEND");
        env::remove_var("NEWSFLOW_PARAMS_PATH");
        env::remove_var("NEWSFLOW_SOURCES_PATH");
        env::remove_var("NEWSFLOW_DB_PATH");
        env::remove_var("NEWSFLOW_TICKER_MASTER");

        let config = RuntimeConfig::from_env();

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.backend, BackendType::Jsonl);
        assert_eq!(config.params_path, PathBuf::from("configs/params.yaml"));
        assert_eq!(config.db_path, PathBuf::from("data/processed/newsflow.db"));
        assert_eq!(config.market_raw_dir(), PathBuf::from("data/raw/market"));

        env::set_var("NEWSFLOW_DATA_DIR", "/tmp/nf");
        env::set_var("NEWSFLOW_BACKEND", "SQLite");
        env::set_var("NEWSFLOW_DB_PATH", "/tmp/nf.db");

        let config = RuntimeConfig::from_env();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/nf"));
        assert_eq!(config.backend, BackendType::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("/tmp/nf.db"));
        assert_eq!(
            config.ticker_master_path,
            PathBuf::from("/tmp/nf/krx/krx_master.csv")
        );

        env::remove_var("NEWSFLOW_DATA_DIR");
        env::remove_var("NEWSFLOW_BACKEND");
        env::remove_var("NEWSFLOW_DB_PATH");
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(BackendType::parse("jsonl"), Some(BackendType::Jsonl));
        assert_eq!(BackendType::parse(" sqlite "), Some(BackendType::Sqlite));
        assert_eq!(BackendType::parse("parquet"), None);
    }
}
