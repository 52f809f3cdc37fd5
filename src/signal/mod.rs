//! Signal fusion and the buy/watch/exclude decision

pub mod decision;
pub mod fusion;

pub use decision::{Decision, DecisionPolicy};
pub use fusion::{build_signals, fuse_scores, rank_score, FusionScore, Signal};
