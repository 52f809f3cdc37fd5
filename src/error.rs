//! Error type shared by every pipeline stage

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Required columns could not be resolved by any candidate name
    #[error("{file}: missing required columns: {}", missing.join(", "))]
    MissingColumns { file: String, missing: Vec<String> },

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
