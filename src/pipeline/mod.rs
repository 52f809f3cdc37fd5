//! Stage orchestration

pub mod engine;
pub mod stage;

pub use engine::PipelineEngine;
pub use stage::{PipelineStage, StageOutcome};
