//! Event normalization: dedup, ids, classification, salience and novelty

pub mod normalizer;
pub mod taxonomy;
pub mod types;

pub use normalizer::{event_id, normalize_events, salience};
pub use taxonomy::EventTaxonomy;
pub use types::{Event, RawEventRecord};
