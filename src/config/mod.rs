//! Configuration: tunable parameters, alias dictionary, runtime paths

pub mod params;
pub mod runtime;
pub mod sources;

pub use params::{
    ConfidenceWeights, ImpactWeights, PipelineParams, PolarityWeights, RelevanceWeights,
    SignalWeights, ThresholdParams, TopNParams, WeightParams, WindowParams, ZeroBaselinePolicy,
};
pub use runtime::{BackendType, RuntimeConfig};
pub use sources::{SourcesConfig, TickerAliases};
