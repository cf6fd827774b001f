//! Distribution of plays over weekdays, parts of the day and hours.

use super::format::Playtime;
use super::models::{TemporalDistribution, TimeBucket};
use crate::history::PlayEvent;
use chrono::{Datelike, Timelike};

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Named hour bands over hours 1..=24, where midnight counts as hour 24.
const TIME_OF_DAY_BANDS: [(&str, u32, u32); 5] = [
    ("Late Night", 1, 4),
    ("Morning", 5, 11),
    ("Afternoon", 12, 16),
    ("Evening", 17, 20),
    ("Night", 21, 24),
];

#[derive(Default, Clone, Copy)]
struct Counter {
    plays: u64,
    playtime: i64,
}

impl Counter {
    fn add(&mut self, ms: i64) {
        self.plays += 1;
        self.playtime += ms;
    }

    fn into_bucket(self, label: String) -> TimeBucket {
        TimeBucket {
            label,
            plays: self.plays,
            playtime: Playtime::new(self.playtime),
        }
    }
}

/// Index into the time-of-day band table for a clock hour (0..=23).
pub fn time_of_day_band(hour: u32) -> usize {
    let hour = if hour == 0 { 24 } else { hour };
    TIME_OF_DAY_BANDS
        .iter()
        .position(|&(_, from, to)| (from..=to).contains(&hour))
        .unwrap_or(TIME_OF_DAY_BANDS.len() - 1)
}

pub fn time_of_day_label(hour: u32) -> &'static str {
    TIME_OF_DAY_BANDS[time_of_day_band(hour)].0
}

pub fn temporal_distribution<'a>(
    events: impl IntoIterator<Item = &'a PlayEvent>,
) -> TemporalDistribution {
    let mut weekdays = [Counter::default(); 7];
    let mut bands = [Counter::default(); 5];
    let mut hours = [Counter::default(); 24];

    for event in events {
        let weekday = event.end_time.weekday().num_days_from_monday() as usize;
        let hour = event.end_time.hour();
        weekdays[weekday].add(event.ms_played);
        bands[time_of_day_band(hour)].add(event.ms_played);
        hours[hour as usize].add(event.ms_played);
    }

    TemporalDistribution {
        by_weekday: weekdays
            .into_iter()
            .zip(WEEKDAYS)
            .map(|(counter, name)| counter.into_bucket(name.to_string()))
            .collect(),
        by_time_of_day: bands
            .into_iter()
            .zip(TIME_OF_DAY_BANDS)
            .map(|(counter, (name, _, _))| counter.into_bucket(name.to_string()))
            .collect(),
        by_hour: hours
            .into_iter()
            .enumerate()
            .map(|(hour, counter)| counter.into_bucket(format!("{:02}:00", hour)))
            .collect(),
    }
}
