//! Raw input adapters: feed dumps and market tick files

pub mod market_reader;
pub mod rss_reader;

pub use market_reader::{list_market_files, read_market_file};
pub use rss_reader::{latest_raw_events_file, read_raw_events};
