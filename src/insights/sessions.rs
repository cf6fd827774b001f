//! Listening session segmentation.

use crate::history::PlayEvent;
use chrono::{DateTime, TimeDelta, Utc};
use std::ops::Range;

/// A maximal run of events with no gap longer than the session gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Positions of the member events in the sorted input.
    pub events: Range<usize>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub playtime: i64,
}

impl Session {
    fn open(index: usize, event: &PlayEvent) -> Self {
        Self {
            events: index..index + 1,
            start: event.end_time,
            end: event.end_time,
            playtime: event.ms_played,
        }
    }

    fn extend(&mut self, event: &PlayEvent) {
        self.events.end += 1;
        self.end = event.end_time;
        self.playtime += event.ms_played;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Split time-sorted events into sessions. A gap strictly greater than `gap`
/// between consecutive end times starts a new session.
pub fn split_sessions(sorted: &[&PlayEvent], gap: TimeDelta) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut current: Option<Session> = None;

    for (index, event) in sorted.iter().enumerate() {
        if let Some(session) = current
            .as_mut()
            .filter(|session| event.end_time - session.end <= gap)
        {
            session.extend(event);
            continue;
        }
        if let Some(done) = current.replace(Session::open(index, event)) {
            sessions.push(done);
        }
    }

    sessions.extend(current);
    sessions
}

/// The session with the most playtime; the earliest wins a tie.
pub fn longest_session(sessions: &[Session]) -> Option<&Session> {
    sessions
        .iter()
        .fold(None, |best: Option<&Session>, session| match best {
            Some(b) if b.playtime >= session.playtime => Some(b),
            _ => Some(session),
        })
}
