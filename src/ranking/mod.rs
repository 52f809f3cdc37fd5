//! Per-event rankings: relevance axis and volume-uplift axis

pub mod dense_rank;
pub mod relevance;
pub mod volume;
pub mod window;

pub use dense_rank::{dense_rank_by_group, dense_rank_desc};
pub use relevance::{rank_by_relevance, RelevanceEntry};
pub use volume::{rank_by_volume, VolumeEntry};
pub use window::{BarIndex, VolumeWindowStats};
