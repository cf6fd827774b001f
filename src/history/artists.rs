//! Per-artist playtime totals with case-insensitive deduplication.

use super::models::{ArtistKey, PlayEvent};
use std::collections::HashMap;

/// Accumulated playtime for one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistTotal {
    pub key: ArtistKey,
    /// Display name of the first event seen for this artist.
    pub name: String,
    pub playtime: i64,
}

/// Per-artist playtime, in first-seen order.
///
/// Names that differ only in case or surrounding whitespace collapse onto the
/// same [`ArtistKey`]; the first spelling encountered stays canonical.
#[derive(Debug, Clone, Default)]
pub struct ArtistTotals {
    entries: Vec<ArtistTotal>,
    index: HashMap<ArtistKey, usize>,
}

impl ArtistTotals {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a PlayEvent>) -> Self {
        let mut totals = Self::default();
        for event in events {
            totals.add(&event.artist_name, event.ms_played);
        }
        totals
    }

    /// Add playtime for `name`, registering it as canonical if the key is new.
    pub fn add(&mut self, name: &str, ms_played: i64) {
        let key = ArtistKey::from_name(name);
        match self.index.get(&key) {
            Some(&position) => self.entries[position].playtime += ms_played,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(ArtistTotal {
                    key,
                    name: name.to_string(),
                    playtime: ms_played,
                });
            }
        }
    }

    pub fn entries(&self) -> &[ArtistTotal] {
        &self.entries
    }

    pub fn get(&self, key: &ArtistKey) -> Option<&ArtistTotal> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    pub fn canonical_name(&self, key: &ArtistKey) -> Option<&str> {
        self.get(key).map(|total| total.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
