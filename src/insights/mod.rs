//! Listening insights: rankings, temporal patterns, sessions, streaks and more.

mod engine;
mod format;
mod holidays;
mod models;
mod sessions;
mod streaks;
mod temporal;

pub use engine::{compute_insights, InsightSettings};
pub use format::{readable_duration, Playtime};
pub use holidays::{holiday_index, Holiday, HOLIDAYS};
pub use models::*;
pub use sessions::{longest_session, split_sessions, Session};
pub use streaks::{longest_streak, streaks, DaySets, Streak};
pub use temporal::{temporal_distribution, time_of_day_label};
