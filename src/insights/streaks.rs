//! Consecutive-day streak detection.

use chrono::{Days, NaiveDate};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub start: NaiveDate,
    pub days: u32,
}

impl Streak {
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days.saturating_sub(1))))
            .unwrap_or(self.start)
    }
}

/// All maximal runs of consecutive days, in date order.
pub fn streaks(days: &BTreeSet<NaiveDate>) -> Vec<Streak> {
    let mut found = Vec::new();
    let mut open: Option<(Streak, NaiveDate)> = None;

    for &day in days {
        open = match open {
            Some((mut streak, last)) if last.succ_opt() == Some(day) => {
                streak.days += 1;
                Some((streak, day))
            }
            Some((streak, _)) => {
                found.push(streak);
                Some((Streak { start: day, days: 1 }, day))
            }
            None => Some((Streak { start: day, days: 1 }, day)),
        };
    }

    if let Some((streak, _)) = open {
        found.push(streak);
    }
    found
}

/// The longest run; the earliest wins a tie.
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> Option<Streak> {
    streaks(days)
        .into_iter()
        .fold(None, |best: Option<Streak>, streak| match best {
            Some(b) if b.days >= streak.days => Some(b),
            _ => Some(streak),
        })
}

/// Distinct listening days per key, in first-seen key order.
#[derive(Debug, Clone)]
pub struct DaySets<K> {
    keys: Vec<K>,
    days: HashMap<K, BTreeSet<NaiveDate>>,
}

impl<K> Default for DaySets<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            days: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> DaySets<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, day: NaiveDate) {
        if !self.days.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.days.entry(key).or_default().insert(day);
    }

    /// Longest streak per key, in first-seen key order.
    pub fn longest_streaks(&self) -> Vec<(&K, Streak)> {
        self.keys
            .iter()
            .filter_map(|key| {
                let streak = longest_streak(self.days.get(key)?)?;
                Some((key, streak))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(u64::from(n)))
            .unwrap()
    }

    fn set(days: &[u32]) -> BTreeSet<NaiveDate> {
        days.iter().map(|&n| day(n)).collect()
    }

    #[test]
    fn test_gap_closes_streak() {
        // Five days, two days off, six days
        let days = set(&[0, 1, 2, 3, 4, 7, 8, 9, 10, 11, 12]);
        let runs = streaks(&days);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].days, 5);
        assert_eq!(runs[1].days, 6);

        let longest = longest_streak(&days).unwrap();
        assert_eq!(longest.days, 6);
        assert_eq!(longest.start, day(7));
        assert_eq!(longest.end(), day(12));
    }

    #[test]
    fn test_tie_prefers_earliest() {
        let longest = longest_streak(&set(&[0, 1, 5, 6])).unwrap();
        assert_eq!(longest.start, day(0));
        assert_eq!(longest.days, 2);
    }

    #[test]
    fn test_single_day_and_empty() {
        let single = longest_streak(&set(&[3])).unwrap();
        assert_eq!(single.days, 1);
        assert_eq!(single.end(), single.start);
        assert!(longest_streak(&BTreeSet::new()).is_none());
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let days: BTreeSet<NaiveDate> = [
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(longest_streak(&days).unwrap().days, 3);
    }

    #[test]
    fn test_day_sets_keep_first_seen_order() {
        let mut sets = DaySets::new();
        sets.insert("b", day(0));
        sets.insert("a", day(0));
        sets.insert("b", day(1));
        sets.insert("b", day(1));

        let longest = sets.longest_streaks();
        assert_eq!(longest.len(), 2);
        assert_eq!(*longest[0].0, "b");
        assert_eq!(longest[0].1.days, 2);
        assert_eq!(*longest[1].0, "a");
    }
}
