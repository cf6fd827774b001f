//! Computes the consolidated listening insights document.

use super::format::{ratio, round2, Playtime};
use super::holidays::{holiday_index, HOLIDAYS};
use super::models::*;
use super::sessions::{longest_session, split_sessions};
use super::streaks::{longest_streak, DaySets};
use super::temporal::temporal_distribution;
use crate::genres::GenreRollup;
use crate::history::{ArtistKey, ArtistTotals, PlayEvent, UNKNOWN_GENRE};
use crate::tally::{Tally, TallyEntry};
use chrono::{NaiveDate, TimeDelta};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightSettings {
    /// Length of the top songs / artists / genres / skipped lists.
    pub top_limit: usize,
    /// Tracks listed per holiday.
    pub holiday_top: usize,
    /// Plays shorter than this count as skips.
    pub skip_threshold_ms: i64,
    pub session_gap: TimeDelta,
    pub min_artist_streak_days: u32,
    pub min_rotation_days: u32,
    pub min_rotation_plays: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            top_limit: 10,
            holiday_top: 5,
            skip_threshold_ms: 30_000,
            session_gap: TimeDelta::minutes(10),
            min_artist_streak_days: 5,
            min_rotation_days: 3,
            min_rotation_plays: 5,
        }
    }
}

type TrackKey = (String, String);

fn track_key(event: &PlayEvent) -> TrackKey {
    (event.track_name.clone(), event.artist_name.clone())
}

fn ranked_song(entry: &TallyEntry<TrackKey>) -> RankedSong {
    RankedSong {
        track: entry.key.0.clone(),
        artist: entry.key.1.clone(),
        plays: entry.plays,
        playtime: Playtime::new(entry.playtime),
    }
}

fn average_ms(total: i64, count: usize) -> i64 {
    ratio(total as f64, count as f64).round() as i64
}

/// Derive every insight from `events`, using `rollup` for genre rankings.
///
/// Artist display names come from `artist_totals`, so they match the names
/// used by the genre documents of the same run.
pub fn compute_insights(
    events: &[PlayEvent],
    artist_totals: &ArtistTotals,
    rollup: &GenreRollup,
    settings: &InsightSettings,
) -> ListeningInsights {
    let mut sorted: Vec<&PlayEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.end_time);
    let mut songs: Tally<TrackKey> = Tally::new();
    let mut artists: Tally<ArtistKey> = Tally::new();
    let mut skips: Tally<TrackKey> = Tally::new();
    let mut track_plays: Tally<TrackKey> = Tally::new();
    let mut artist_days: DaySets<ArtistKey> = DaySets::new();
    let mut track_days: DaySets<TrackKey> = DaySets::new();
    let mut holiday_tallies: Vec<Tally<TrackKey>> = vec![Tally::new(); HOLIDAYS.len()];
    let mut active_days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut unique_tracks: HashSet<(String, ArtistKey)> = HashSet::new();
    let mut total_playtime: i64 = 0;

    for event in &sorted {
        let day = event.end_time.date_naive();
        let artist_key = event.artist_key();
        total_playtime += event.ms_played;
        active_days.insert(day);
        artists.add(artist_key.clone(), event.ms_played);
        artist_days.insert(artist_key.clone(), day);
        unique_tracks.insert((event.track_name.clone(), artist_key));

        if event.has_placeholder_names() {
            continue;
        }

        let key = track_key(event);
        songs.add(key.clone(), event.ms_played);
        track_plays.bump(key.clone());
        track_days.insert(key.clone(), day);
        if event.ms_played < settings.skip_threshold_ms {
            skips.bump(key.clone());
        }
        if let Some(index) = holiday_index(day) {
            holiday_tallies[index].add(key, event.ms_played);
        }
    }

    let top_songs = songs
        .by_playtime()
        .into_iter()
        .take(settings.top_limit)
        .map(ranked_song)
        .collect();

    let top_artists = artists
        .by_playtime()
        .into_iter()
        .take(settings.top_limit)
        .map(|entry| RankedArtist {
            artist: artist_totals
                .canonical_name(&entry.key)
                .unwrap_or(entry.key.as_str())
                .to_string(),
            plays: entry.plays,
            playtime: Playtime::new(entry.playtime),
        })
        .collect();

    let mut genre_totals: Vec<(String, i64)> = rollup
        .genre_totals()
        .into_iter()
        .filter(|(genre, _)| genre != UNKNOWN_GENRE)
        .collect();
    genre_totals.sort_by(|a, b| b.1.cmp(&a.1));
    let top_genres = genre_totals
        .into_iter()
        .take(settings.top_limit)
        .map(|(genre, ms)| RankedGenre {
            genre,
            playtime: Playtime::new(ms),
        })
        .collect();

    let sessions = session_summary(&sorted, settings);
    let listening_streak = listening_streak(&active_days);

    let mut artist_streaks: Vec<ArtistStreak> = artist_days
        .longest_streaks()
        .into_iter()
        .filter(|(_, streak)| streak.days >= settings.min_artist_streak_days)
        .map(|(key, streak)| ArtistStreak {
            artist: artist_totals
                .canonical_name(key)
                .unwrap_or(key.as_str())
                .to_string(),
            days: streak.days,
            start: streak.start,
            end: streak.end(),
        })
        .collect();
    artist_streaks.sort_by(|a, b| b.days.cmp(&a.days));

    let mut rotations: Vec<TrackRotation> = track_days
        .longest_streaks()
        .into_iter()
        .filter_map(|(key, streak)| {
            let plays = track_plays.get(key).map_or(0, |entry| entry.plays);
            if streak.days < settings.min_rotation_days || plays < settings.min_rotation_plays {
                return None;
            }
            Some(TrackRotation {
                track: key.0.clone(),
                artist: key.1.clone(),
                days: streak.days,
                plays,
                start: streak.start,
                end: streak.end(),
            })
        })
        .collect();
    rotations.sort_by(|a, b| b.days.cmp(&a.days).then(b.plays.cmp(&a.plays)));

    let top_skipped = skips
        .by_plays()
        .into_iter()
        .take(settings.top_limit)
        .map(|entry| SkippedTrack {
            track: entry.key.0.clone(),
            artist: entry.key.1.clone(),
            skips: entry.plays,
        })
        .collect();

    let unique_artists = artists.len();
    let diversity = Diversity {
        unique_artists,
        unique_tracks: unique_tracks.len(),
        total_plays: sorted.len(),
        track_diversity: round2(ratio(unique_tracks.len() as f64, sorted.len() as f64)),
        artist_diversity: round2(ratio(unique_artists as f64, unique_tracks.len() as f64)),
    };

    let averages = listening_averages(total_playtime, &active_days);

    let holidays = HOLIDAYS
        .iter()
        .zip(&holiday_tallies)
        .filter(|(_, tally)| !tally.is_empty())
        .map(|(holiday, tally)| HolidayHighlight {
            holiday: holiday.name.to_string(),
            date: holiday.month_day(),
            top_tracks: tally
                .by_playtime()
                .into_iter()
                .take(settings.holiday_top)
                .map(ranked_song)
                .collect(),
        })
        .collect();

    debug!(
        "Computed insights over {} events, {} active days",
        sorted.len(),
        active_days.len()
    );

    ListeningInsights {
        summary: ListeningSummary {
            total_plays: sorted.len(),
            total_playtime: Playtime::new(total_playtime),
            first_listen: sorted.first().map(|e| e.end_time),
            last_listen: sorted.last().map(|e| e.end_time),
        },
        top_songs,
        top_artists,
        top_genres,
        temporal: temporal_distribution(sorted.iter().copied()),
        sessions,
        listening_streak,
        artist_streaks,
        rotations,
        top_skipped,
        diversity,
        averages,
        holidays,
    }
}

fn session_summary(sorted: &[&PlayEvent], settings: &InsightSettings) -> SessionSummary {
    let sessions = split_sessions(sorted, settings.session_gap);
    let total_playtime: i64 = sessions.iter().map(|s| s.playtime).sum();
    let total_tracks: usize = sessions.iter().map(|s| s.len()).sum();

    SessionSummary {
        count: sessions.len(),
        average_playtime: Playtime::new(average_ms(total_playtime, sessions.len())),
        average_tracks: round2(ratio(total_tracks as f64, sessions.len() as f64)),
        longest: longest_session(&sessions).map(|session| SessionRecord {
            start: session.start,
            end: session.end,
            tracks: session.len(),
            playtime: Playtime::new(session.playtime),
        }),
    }
}

fn listening_streak(active_days: &BTreeSet<NaiveDate>) -> ListeningStreak {
    let longest = longest_streak(active_days);
    ListeningStreak {
        longest_days: longest.map_or(0, |streak| streak.days),
        start: longest.map(|streak| streak.start),
        end: longest.map(|streak| streak.end()),
        active_days: active_days.len(),
    }
}

fn listening_averages(total_playtime: i64, active_days: &BTreeSet<NaiveDate>) -> ListeningAverages {
    let span_days = match (active_days.first(), active_days.last()) {
        (Some(first), Some(last)) => (*last - *first).num_days() + 1,
        _ => 0,
    };
    let weeks = (span_days + 6) / 7;

    ListeningAverages {
        per_active_day: Playtime::new(average_ms(total_playtime, active_days.len())),
        per_week: Playtime::new(average_ms(total_playtime, weeks as usize)),
    }
}
