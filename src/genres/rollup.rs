//! Genre to artists join used by the genre document and genre rankings.

use super::mapping::GenreMapping;
use crate::history::{ArtistTotals, UNKNOWN_GENRE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtistPlaytime {
    pub name: String,
    pub playtime: i64,
}

/// Artists filed under one genre, in first-seen artist order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenreArtists {
    pub genre: String,
    pub artists: Vec<ArtistPlaytime>,
}

/// Genre to artists join, in first-encountered genre order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct GenreRollup(Vec<GenreArtists>);

impl GenreRollup {
    /// An artist with several genres contributes its full playtime to each.
    /// Artists absent from `mapping` are filed under the sentinel genre.
    pub fn build(totals: &ArtistTotals, mapping: &GenreMapping) -> Self {
        let mut groups: Vec<GenreArtists> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for artist in totals.entries() {
            let fallback = [UNKNOWN_GENRE.to_string()];
            let genres = mapping.get(&artist.name).unwrap_or(&fallback);

            for genre in genres {
                let position = *index.entry(genre.clone()).or_insert_with(|| {
                    groups.push(GenreArtists {
                        genre: genre.clone(),
                        artists: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[position].artists.push(ArtistPlaytime {
                    name: artist.name.clone(),
                    playtime: artist.playtime,
                });
            }
        }

        Self(groups)
    }

    pub fn groups(&self) -> &[GenreArtists] {
        &self.0
    }

    /// Summed playtime per genre, in the same order as [`Self::groups`].
    pub fn genre_totals(&self) -> Vec<(String, i64)> {
        self.0
            .iter()
            .map(|group| {
                (
                    group.genre.clone(),
                    group.artists.iter().map(|a| a.playtime).sum(),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
