//! Canonical listening-history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for events exported without an artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Placeholder for events exported without a track title.
pub const UNKNOWN_TRACK: &str = "Unknown Track";

/// Genre label assigned to artists the lookup service could not classify.
pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// A single normalized play event.
///
/// Produced once by the normalizer and only read afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayEvent {
    pub track_name: String,
    pub artist_name: String,
    pub end_time: DateTime<Utc>,
    /// Milliseconds played, as reported by the export (not validated)
    pub ms_played: i64,
}

impl PlayEvent {
    /// Display label used as the per-song aggregation key: `"track (artist)"`.
    pub fn song_label(&self) -> String {
        format!("{} ({})", self.track_name, self.artist_name)
    }

    pub fn artist_key(&self) -> ArtistKey {
        ArtistKey::from_name(&self.artist_name)
    }

    /// True if either the track or the artist is a placeholder value.
    pub fn has_placeholder_names(&self) -> bool {
        self.track_name == UNKNOWN_TRACK || self.artist_name == UNKNOWN_ARTIST
    }
}

/// Normalized artist identity used for deduplication.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ArtistKey(String);

impl ArtistKey {
    pub fn from_name(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw record as it appears in a `StreamingHistory_music_*.json` file.
///
/// Every field is optional so that partially filled records still normalize.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayRecord {
    pub artist_name: Option<String>,
    pub track_name: Option<String>,
    pub end_time: Option<String>,
    pub ms_played: Option<i64>,
}

/// Contents of one history file, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub origin: String,
    pub contents: String,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            contents: contents.into(),
        }
    }
}
