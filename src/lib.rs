//! newsflow - news-driven equity signal pipeline
//!
//! Raw feed dumps and market tick files flow through a fixed chain of batch
//! stages (normalize, score, market, mapping, rankings, rankings_volume,
//! signals). Every stage persists a complete snapshot so any later stage can be
//! re-run on its own.

pub mod columns;
pub mod config;
pub mod error;
pub mod eventing;
pub mod ingestion;
pub mod mapping;
pub mod market;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod signal;
pub mod store;
pub mod timeparse;

pub use error::{PipelineError, Result};
