//! Tunable pipeline parameters (`params.yaml`)
//!
//! Every section and key has a default, so a missing or partial file is valid.
//! The parsed struct is immutable and handed to each stage explicitly.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub rules: RuleParams,
    pub weights: WeightParams,
    pub topn: TopNParams,
    pub windows: WindowParams,
    pub thresholds: ThresholdParams,
}

/// Extra event-type keywords, unioned with the built-in taxonomy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    pub event_types: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightParams {
    pub polarity: PolarityWeights,
    pub impact: ImpactWeights,
    pub confidence: ConfidenceWeights,
    pub relevance: RelevanceWeights,
    pub signal: SignalWeights,
}

/// Keyword lists for polarity. A configured list replaces the default one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarityWeights {
    pub positive_kws: Vec<String>,
    pub negative_kws: Vec<String>,
}

impl Default for PolarityWeights {
    fn default() -> Self {
        let to_vec = |kws: &[&str]| kws.iter().map(|s| s.to_string()).collect();
        Self {
            positive_kws: to_vec(&[
                "호재", "수혜", "상승", "급등", "수주", "계약", "흑자", "최대 실적", "승인",
                "surge", "beat", "upgrade", "record high", "approval",
            ]),
            negative_kws: to_vec(&[
                "악재", "하락", "급락", "적자", "소송", "리콜", "감산", "중단", "제재",
                "plunge", "miss", "downgrade", "lawsuit", "recall",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactWeights {
    pub salience_weight: f64,
    pub novelty_weight: f64,
    /// Per-event-type multipliers (`policy: 1.2`, ...); unlisted types use 1.0
    #[serde(flatten)]
    pub type_weights: BTreeMap<String, f64>,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            salience_weight: 0.5,
            novelty_weight: 0.5,
            type_weights: BTreeMap::new(),
        }
    }
}

impl ImpactWeights {
    pub fn type_weight(&self, event_type: &str) -> f64 {
        self.type_weights.get(event_type).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Trust per feed or source name, plus an optional `default` entry
    pub source_trust: BTreeMap<String, f64>,
    pub time_decay_minutes: f64,
    pub min_confidence: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            source_trust: BTreeMap::new(),
            time_decay_minutes: 180.0,
            min_confidence: 0.2,
        }
    }
}

impl ConfidenceWeights {
    /// Feed name first, then source name, then `default` (0.5 when unset)
    pub fn trust_for(&self, feed_name: &str, source: &str) -> f64 {
        let lookup = |key: &str| -> Option<f64> {
            if key.is_empty() {
                return None;
            }
            let key = key.to_lowercase();
            self.source_trust
                .iter()
                .find(|(k, _)| k.to_lowercase() == key)
                .map(|(_, v)| *v)
        };

        lookup(feed_name)
            .or_else(|| lookup(source))
            .or_else(|| self.source_trust.get("default").copied())
            .unwrap_or(0.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceWeights {
    pub name_hit: f64,
    pub brand_hit: f64,
    pub title_keyword: f64,
    pub summary_keyword: f64,
    pub salience_boost: f64,
    /// Raw score that maps to relevance 1.0
    pub max_raw: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            name_hit: 1.0,
            brand_hit: 0.8,
            title_keyword: 0.5,
            summary_keyword: 0.2,
            salience_boost: 0.2,
            max_raw: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub w_base: f64,
    pub w_rel: f64,
    pub w_vol: f64,
    pub w_mix: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            w_base: 0.5,
            w_rel: 0.3,
            w_vol: 0.2,
            w_mix: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopNParams {
    pub relevance: u32,
    pub volume: u32,
}

impl Default for TopNParams {
    fn default() -> Self {
        Self {
            relevance: 10,
            volume: 10,
        }
    }
}

/// What a zero baseline mean does to the uplift of a pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroBaselinePolicy {
    /// Divide by a tiny epsilon: huge but finite uplift
    #[default]
    Epsilon,
    /// Drop the pair from the volume ranking
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    pub baseline_days: i64,
    pub post_minutes: i64,
    pub zero_baseline: ZeroBaselinePolicy,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            baseline_days: 5,
            post_minutes: 60,
            zero_baseline: ZeroBaselinePolicy::Epsilon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    pub buy_score_buy: f64,
    pub buy_score_watch: f64,
    pub require_positive_base: bool,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            buy_score_buy: 0.70,
            buy_score_watch: 0.50,
            require_positive_base: true,
        }
    }
}

impl PipelineParams {
    /// Load from YAML. A missing or empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("⚙️  No params file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let params = Self::from_yaml_str(&content).map_err(|source| PipelineError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        params.validate()?;

        log::info!("⚙️  Loaded params from {}", path.display());
        Ok(params)
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.topn.relevance == 0 || self.topn.volume == 0 {
            return Err(PipelineError::InvalidConfig(
                "topn.relevance and topn.volume must be at least 1".to_string(),
            ));
        }
        if self.windows.baseline_days < 0 || self.windows.post_minutes < 0 {
            return Err(PipelineError::InvalidConfig(
                "windows.baseline_days and windows.post_minutes cannot be negative".to_string(),
            ));
        }
        if self.thresholds.buy_score_watch > self.thresholds.buy_score_buy {
            return Err(PipelineError::InvalidConfig(format!(
                "thresholds.buy_score_watch ({}) exceeds thresholds.buy_score_buy ({})",
                self.thresholds.buy_score_watch, self.thresholds.buy_score_buy
            )));
        }
        if self.weights.relevance.max_raw <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "weights.relevance.max_raw must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let params = PipelineParams::default();

        assert_eq!(params.topn.relevance, 10);
        assert_eq!(params.topn.volume, 10);
        assert_eq!(params.windows.baseline_days, 5);
        assert_eq!(params.windows.post_minutes, 60);
        assert_eq!(params.windows.zero_baseline, ZeroBaselinePolicy::Epsilon);
        assert_eq!(params.thresholds.buy_score_buy, 0.70);
        assert_eq!(params.thresholds.buy_score_watch, 0.50);
        assert!(params.thresholds.require_positive_base);
        assert_eq!(params.weights.signal.w_base, 0.5);
        assert_eq!(params.weights.signal.w_mix, 0.0);
        assert_eq!(params.weights.relevance.brand_hit, 0.8);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
topn:
  relevance: 3
weights:
  impact:
    policy: 1.2
    salience_weight: 0.7
  confidence:
    source_trust:
      yonhap: 0.9
      default: 0.4
windows:
  zero_baseline: exclude
"#;
        let params = PipelineParams::from_yaml_str(yaml).unwrap();

        assert_eq!(params.topn.relevance, 3);
        assert_eq!(params.topn.volume, 10);
        assert_eq!(params.weights.impact.salience_weight, 0.7);
        assert_eq!(params.weights.impact.novelty_weight, 0.5);
        assert_eq!(params.weights.impact.type_weight("policy"), 1.2);
        assert_eq!(params.weights.impact.type_weight("other"), 1.0);
        assert_eq!(params.weights.confidence.trust_for("Yonhap", ""), 0.9);
        assert_eq!(params.weights.confidence.trust_for("unknown", "unknown"), 0.4);
        assert_eq!(params.windows.zero_baseline, ZeroBaselinePolicy::Exclude);
        assert_eq!(params.windows.post_minutes, 60);
    }

    #[test]
    fn test_trust_lookup_order() {
        let mut conf = ConfidenceWeights::default();
        conf.source_trust.insert("feed_a".to_string(), 0.9);
        conf.source_trust.insert("source_b".to_string(), 0.7);

        assert_eq!(conf.trust_for("feed_a", "source_b"), 0.9);
        assert_eq!(conf.trust_for("feed_x", "source_b"), 0.7);
        assert_eq!(conf.trust_for("feed_x", "source_x"), 0.5);
    }

    #[test]
    fn test_configured_polarity_list_replaces_default() {
        let yaml = "weights:\n  polarity:\n    positive_kws: [\"good\"]\n";
        let params = PipelineParams::from_yaml_str(yaml).unwrap();

        assert_eq!(params.weights.polarity.positive_kws, vec!["good".to_string()]);
        assert!(!params.weights.polarity.negative_kws.is_empty());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let params = PipelineParams::from_yaml_str("  \n").unwrap();
        assert_eq!(params, PipelineParams::default());
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut params = PipelineParams::default();
        params.thresholds.buy_score_watch = 0.9;
        assert!(params.validate().is_err());

        let mut params = PipelineParams::default();
        params.topn.volume = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let params = PipelineParams::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(params, PipelineParams::default());
    }
}
