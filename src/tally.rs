//! Insertion-ordered counters shared by the aggregators.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry<K> {
    pub key: K,
    pub plays: u64,
    pub playtime: i64,
}

/// Play counts and playtime per key, remembering first-seen order so that
/// rankings break ties deterministically.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    entries: Vec<TallyEntry<K>>,
    index: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one play of `ms` milliseconds for `key`.
    pub fn add(&mut self, key: K, ms: i64) {
        let entry = self.entry_mut(key);
        entry.plays += 1;
        entry.playtime += ms;
    }

    /// Count one play without playtime.
    pub fn bump(&mut self, key: K) {
        self.entry_mut(key).plays += 1;
    }

    fn entry_mut(&mut self, key: K) -> &mut TallyEntry<K> {
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(TallyEntry {
                    key,
                    plays: 0,
                    playtime: 0,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[position]
    }

    pub fn get(&self, key: &K) -> Option<&TallyEntry<K>> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[TallyEntry<K>] {
        &self.entries
    }

    /// Entries by playtime, descending. Ties keep first-seen order.
    pub fn by_playtime(&self) -> Vec<&TallyEntry<K>> {
        let mut ranked: Vec<_> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.playtime.cmp(&a.playtime));
        ranked
    }

    /// Entries by play count, descending. Ties keep first-seen order.
    pub fn by_plays(&self) -> Vec<&TallyEntry<K>> {
        let mut ranked: Vec<_> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.plays.cmp(&a.plays));
        ranked
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
