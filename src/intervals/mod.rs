//! Time-bucketed song popularity: cumulative and per-bucket top-N views.

mod aggregator;
mod models;

pub use aggregator::{cumulative_by_interval, interval_key, top_by_interval};
pub use models::{IntervalError, IntervalSettings, IntervalSnapshot, SongPlaytime};
