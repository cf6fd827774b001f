//! Fixed-date holiday table.
//!
//! Dates are month-day only. Holidays that move from year to year are pinned
//! to a typical date.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub name: &'static str,
    pub month: u32,
    pub day: u32,
}

impl Holiday {
    const fn new(name: &'static str, month: u32, day: u32) -> Self {
        Self { name, month, day }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }

    /// `MM-DD`
    pub fn month_day(&self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }
}

pub const HOLIDAYS: [Holiday; 10] = [
    Holiday::new("New Year's Day", 1, 1),
    Holiday::new("Valentine's Day", 2, 14),
    Holiday::new("St. Patrick's Day", 3, 17),
    Holiday::new("Easter", 4, 9),
    Holiday::new("Independence Day", 7, 4),
    Holiday::new("Halloween", 10, 31),
    Holiday::new("Thanksgiving", 11, 28),
    Holiday::new("Christmas Eve", 12, 24),
    Holiday::new("Christmas Day", 12, 25),
    Holiday::new("New Year's Eve", 12, 31),
];

/// Position in [`HOLIDAYS`] of the holiday falling on `date`.
pub fn holiday_index(date: NaiveDate) -> Option<usize> {
    HOLIDAYS.iter().position(|holiday| holiday.matches(date))
}
