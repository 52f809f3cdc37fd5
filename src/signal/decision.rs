//! Decision policy with configurable thresholds

use crate::config::ThresholdParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Buy,
    Watch,
    Exclude,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "buy",
            Decision::Watch => "watch",
            Decision::Exclude => "exclude",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct DecisionPolicy {
    buy_threshold: f64,
    watch_threshold: f64,
    require_positive_base: bool,
}

impl DecisionPolicy {
    pub fn new(buy_threshold: f64, watch_threshold: f64, require_positive_base: bool) -> Self {
        Self {
            buy_threshold,
            watch_threshold,
            require_positive_base,
        }
    }

    pub fn from_params(params: &ThresholdParams) -> Self {
        Self::new(
            params.buy_score_buy,
            params.buy_score_watch,
            params.require_positive_base,
        )
    }

    pub fn with_defaults() -> Self {
        Self::from_params(&ThresholdParams::default())
    }

    /// Map a buy score to a decision
    ///
    /// # Priority
    /// A negative base signal caps the decision at WATCH when
    /// `require_positive_base` is set, whatever the score.
    pub fn decide(&self, buy_score: f64, base_signal: f64) -> Decision {
        if self.require_positive_base && base_signal < 0.0 {
            return if buy_score >= self.watch_threshold {
                Decision::Watch
            } else {
                Decision::Exclude
            };
        }

        if buy_score >= self.buy_threshold {
            Decision::Buy
        } else if buy_score >= self.watch_threshold {
            Decision::Watch
        } else {
            Decision::Exclude
        }
    }
}
