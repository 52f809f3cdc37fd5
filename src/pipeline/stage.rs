use crate::store::Stage;

/// One runnable pipeline step, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Normalize,
    Score,
    Market,
    Mapping,
    Rankings,
    RankingsVolume,
    Signals,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Normalize => "normalize",
            PipelineStage::Score => "score",
            PipelineStage::Market => "market",
            PipelineStage::Mapping => "mapping",
            PipelineStage::Rankings => "rankings",
            PipelineStage::RankingsVolume => "rankings_volume",
            PipelineStage::Signals => "signals",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::all().into_iter().find(|stage| stage.as_str() == s)
    }

    pub fn all() -> [PipelineStage; 7] {
        [
            PipelineStage::Normalize,
            PipelineStage::Score,
            PipelineStage::Market,
            PipelineStage::Mapping,
            PipelineStage::Rankings,
            PipelineStage::RankingsVolume,
            PipelineStage::Signals,
        ]
    }

    /// Snapshot this step replaces
    pub fn output(&self) -> Stage {
        match self {
            PipelineStage::Normalize | PipelineStage::Score => Stage::Events,
            PipelineStage::Market => Stage::Market,
            PipelineStage::Mapping => Stage::Mapping,
            PipelineStage::Rankings => Stage::Rankings,
            PipelineStage::RankingsVolume => Stage::RankingsVolume,
            PipelineStage::Signals => Stage::Signals,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Snapshot replaced (possibly with zero rows)
    Written { rows: usize },
    /// Upstream input missing; nothing written
    Skipped { reason: String },
}

impl StageOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StageOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, StageOutcome::Written { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stage_names() {
        assert_eq!(PipelineStage::parse("Rankings_Volume"), Some(PipelineStage::RankingsVolume));
        assert_eq!(PipelineStage::parse("score"), Some(PipelineStage::Score));
        assert_eq!(PipelineStage::parse("events"), None);
    }

    #[test]
    fn test_outputs_follow_dependency_order() {
        let outputs: Vec<Stage> = PipelineStage::all().iter().map(|s| s.output()).collect();
        assert_eq!(outputs[0], Stage::Events);
        assert_eq!(outputs[1], Stage::Events);
        assert_eq!(outputs[6], Stage::Signals);
    }
}
