use super::models::{IntervalSettings, IntervalSnapshot, SongPlaytime};
use crate::history::PlayEvent;
use crate::tally::Tally;
use chrono::{DateTime, NaiveDate, Utc};

/// Start day of the bucket containing `end_time`.
///
/// Buckets are aligned on the Unix epoch: the start is
/// `floor(epoch_ms / width) * width`.
pub fn interval_key(end_time: &DateTime<Utc>, settings: &IntervalSettings) -> NaiveDate {
    let width = settings.bucket_width_ms();
    let start = end_time.timestamp_millis().div_euclid(width) * width;
    DateTime::from_timestamp_millis(start)
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| end_time.date_naive())
}

fn sorted_by_time(events: &[PlayEvent]) -> Vec<&PlayEvent> {
    let mut sorted: Vec<&PlayEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.end_time);
    sorted
}

fn snapshot(bucket: NaiveDate, tally: &Tally<String>, limit: Option<usize>) -> IntervalSnapshot {
    let ranked = tally.by_playtime();
    let take = limit.unwrap_or(ranked.len());
    IntervalSnapshot {
        bucket,
        songs: ranked
            .into_iter()
            .take(take)
            .map(|entry| SongPlaytime {
                name: entry.key.clone(),
                playtime: entry.playtime,
            })
            .collect(),
    }
}

/// Running song totals as of the end of each bucket.
///
/// Every bucket carries the full state of the previous one, so a song keeps
/// appearing with its last total after it stops being played.
pub fn cumulative_by_interval(
    events: &[PlayEvent],
    settings: &IntervalSettings,
) -> Vec<IntervalSnapshot> {
    let mut snapshots = Vec::new();
    let mut running: Tally<String> = Tally::new();
    let mut current: Option<NaiveDate> = None;

    for event in sorted_by_time(events) {
        let bucket = interval_key(&event.end_time, settings);
        if let Some(previous) = current.filter(|previous| *previous != bucket) {
            snapshots.push(snapshot(previous, &running, None));
        }
        current = Some(bucket);
        running.add(event.song_label(), event.ms_played);
    }

    if let Some(last) = current {
        snapshots.push(snapshot(last, &running, None));
    }
    snapshots
}

/// The `top_n` songs of each bucket, counting only that bucket's plays.
pub fn top_by_interval(events: &[PlayEvent], settings: &IntervalSettings) -> Vec<IntervalSnapshot> {
    let mut snapshots = Vec::new();
    let mut bucket_tally: Tally<String> = Tally::new();
    let mut current: Option<NaiveDate> = None;

    for event in sorted_by_time(events) {
        let bucket = interval_key(&event.end_time, settings);
        if let Some(previous) = current.filter(|previous| *previous != bucket) {
            snapshots.push(snapshot(previous, &bucket_tally, Some(settings.top_n())));
            bucket_tally = Tally::new();
        }
        current = Some(bucket);
        bucket_tally.add(event.song_label(), event.ms_played);
    }

    if let Some(last) = current {
        snapshots.push(snapshot(last, &bucket_tally, Some(settings.top_n())));
    }
    snapshots
}
