//! Top-N report with display names from the ticker master

pub mod master;
pub mod topn;

pub use master::{pad_ticker, TickerMaster};
pub use topn::{export_csv, select_topn, TopNAxis, TopNRow};
