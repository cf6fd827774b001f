//! Shapes of the consolidated insights document.

use super::format::Playtime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListeningInsights {
    pub summary: ListeningSummary,
    pub top_songs: Vec<RankedSong>,
    pub top_artists: Vec<RankedArtist>,
    pub top_genres: Vec<RankedGenre>,
    pub temporal: TemporalDistribution,
    pub sessions: SessionSummary,
    pub listening_streak: ListeningStreak,
    pub artist_streaks: Vec<ArtistStreak>,
    pub rotations: Vec<TrackRotation>,
    pub top_skipped: Vec<SkippedTrack>,
    pub diversity: Diversity,
    pub averages: ListeningAverages,
    pub holidays: Vec<HolidayHighlight>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListeningSummary {
    pub total_plays: usize,
    pub total_playtime: Playtime,
    pub first_listen: Option<DateTime<Utc>>,
    pub last_listen: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RankedSong {
    pub track: String,
    pub artist: String,
    pub plays: u64,
    pub playtime: Playtime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RankedArtist {
    pub artist: String,
    pub plays: u64,
    pub playtime: Playtime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RankedGenre {
    pub genre: String,
    pub playtime: Playtime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    pub label: String,
    pub plays: u64,
    pub playtime: Playtime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TemporalDistribution {
    /// Monday through Sunday.
    pub by_weekday: Vec<TimeBucket>,
    /// Late Night, Morning, Afternoon, Evening, Night.
    pub by_time_of_day: Vec<TimeBucket>,
    /// `00:00` through `23:00`.
    pub by_hour: Vec<TimeBucket>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub tracks: usize,
    pub playtime: Playtime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub count: usize,
    pub average_playtime: Playtime,
    pub average_tracks: f64,
    pub longest: Option<SessionRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListeningStreak {
    pub longest_days: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub active_days: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtistStreak {
    pub artist: String,
    pub days: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackRotation {
    pub track: String,
    pub artist: String,
    pub days: u32,
    pub plays: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub track: String,
    pub artist: String,
    pub skips: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Diversity {
    pub unique_artists: usize,
    pub unique_tracks: usize,
    pub total_plays: usize,
    /// unique tracks / total plays
    pub track_diversity: f64,
    /// unique artists / unique tracks
    pub artist_diversity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListeningAverages {
    pub per_active_day: Playtime,
    pub per_week: Playtime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HolidayHighlight {
    pub holiday: String,
    /// `MM-DD`
    pub date: String,
    pub top_tracks: Vec<RankedSong>,
}
