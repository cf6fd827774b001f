//! Artist to genre labels, as stored in the genre cache.

use crate::history::UNKNOWN_GENRE;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Canonical artist display name to genre labels.
///
/// Serialized as a plain JSON object, which is also the on-disk cache format.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct GenreMapping(BTreeMap<String, Vec<String>>);

/// Entries go through [`GenreMapping::insert`], so an empty list read from
/// disk becomes the sentinel.
impl<'de> Deserialize<'de> for GenreMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

impl GenreMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, artist: &str) -> Option<&[String]> {
        self.0.get(artist).map(Vec::as_slice)
    }

    pub fn contains(&self, artist: &str) -> bool {
        self.0.contains_key(artist)
    }

    /// Record genres for `artist`. An empty list is stored as the sentinel so
    /// that every entry stays non-empty.
    pub fn insert(&mut self, artist: impl Into<String>, genres: Vec<String>) {
        let genres = if genres.is_empty() {
            unknown_genre()
        } else {
            genres
        };
        self.0.insert(artist.into(), genres);
    }

    pub fn insert_unknown(&mut self, artist: impl Into<String>) {
        self.0.insert(artist.into(), unknown_genre());
    }

    /// True if the artist is mapped to the sentinel only.
    pub fn is_unknown(&self, artist: &str) -> bool {
        self.get(artist)
            .is_some_and(|genres| genres.len() == 1 && genres[0] == UNKNOWN_GENRE)
    }

    /// Entries for the given names that are present in this mapping.
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> GenreMapping {
        let mut subset = GenreMapping::new();
        for name in names {
            if let Some(genres) = self.0.get(name) {
                subset.0.insert(name.to_string(), genres.clone());
            }
        }
        subset
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for GenreMapping {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        let mut mapping = GenreMapping::new();
        for (artist, genres) in iter {
            mapping.insert(artist, genres);
        }
        mapping
    }
}

pub(crate) fn unknown_genre() -> Vec<String> {
    vec![UNKNOWN_GENRE.to_string()]
}
