use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntervalError {
    #[error("bucket_days must be at least 1")]
    InvalidBucketDays,

    #[error("top_n must be at least 1")]
    InvalidTopN,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSettings {
    bucket_days: u32,
    top_n: usize,
}

impl IntervalSettings {
    pub fn new(bucket_days: u32, top_n: usize) -> Result<Self, IntervalError> {
        if bucket_days == 0 {
            return Err(IntervalError::InvalidBucketDays);
        }
        if top_n == 0 {
            return Err(IntervalError::InvalidTopN);
        }
        Ok(Self { bucket_days, top_n })
    }

    pub fn bucket_days(&self) -> u32 {
        self.bucket_days
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub(crate) fn bucket_width_ms(&self) -> i64 {
        i64::from(self.bucket_days) * 24 * 60 * 60 * 1000
    }
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            bucket_days: 3,
            top_n: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SongPlaytime {
    /// `"track (artist)"`
    pub name: String,
    /// Milliseconds
    pub playtime: i64,
}

/// Songs of one bucket, sorted by playtime descending.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IntervalSnapshot {
    /// First day of the bucket (UTC).
    pub bucket: NaiveDate,
    pub songs: Vec<SongPlaytime>,
}
