use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: f64 = 60_000.0;

/// A playtime in milliseconds together with its display form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Playtime {
    pub ms: i64,
    pub readable: String,
}

impl Playtime {
    pub fn new(ms: i64) -> Self {
        Self {
            ms,
            readable: readable_duration(ms),
        }
    }
}

impl From<i64> for Playtime {
    fn from(ms: i64) -> Self {
        Self::new(ms)
    }
}

/// `"<n> min"` below an hour, `"<h.hh> hours"` from one hour up.
pub fn readable_duration(ms: i64) -> String {
    let minutes = ms as f64 / MS_PER_MINUTE;
    if minutes >= 60.0 {
        format!("{:.2} hours", minutes / 60.0)
    } else {
        format!("{} min", minutes.round() as i64)
    }
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
