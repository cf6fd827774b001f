//! Listening-history analytics: interval popularity, genre classification
//! and listening insights computed from a streaming-history export.

pub mod config;
pub mod genres;
pub mod history;
pub mod insights;
pub mod intervals;
pub mod pipeline;
pub mod tally;

pub use pipeline::{AnalyticsReport, GenreReport, Pipeline, PipelineError};
