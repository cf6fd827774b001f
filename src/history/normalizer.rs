//! Turns raw history documents into canonical [`PlayEvent`]s.
//!
//! A malformed document or record is logged and skipped; it never aborts the
//! rest of the batch.

use super::models::{PlayEvent, RawPlayRecord, SourceDocument, UNKNOWN_ARTIST, UNKNOWN_TRACK};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Naive timestamp layouts accepted for `endTime`, interpreted as UTC.
const NAIVE_END_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("{origin}: invalid JSON: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{origin}: expected a JSON array of play records")]
    NotAnArray { origin: String },

    #[error("record is not a JSON object")]
    RecordNotAnObject,

    #[error("record has invalid fields: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error("missing endTime")]
    MissingEndTime,

    #[error("unparseable endTime: {0}")]
    InvalidEndTime(String),
}

/// Result of normalizing a batch of documents.
#[derive(Debug, Default)]
pub struct NormalizedHistory {
    pub events: Vec<PlayEvent>,
    pub documents_skipped: usize,
    pub records_skipped: usize,
}

/// Parse an `endTime` value.
pub fn parse_end_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_END_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn name_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(name) if !name.trim().is_empty() => name,
        _ => placeholder.to_string(),
    }
}

/// Normalize a single raw record.
pub fn normalize_record(record: &Value) -> Result<PlayEvent, NormalizeError> {
    if !record.is_object() {
        return Err(NormalizeError::RecordNotAnObject);
    }
    let raw: RawPlayRecord = serde_json::from_value(record.clone())?;

    let end_time_str = raw.end_time.ok_or(NormalizeError::MissingEndTime)?;
    let end_time = parse_end_time(&end_time_str)
        .ok_or_else(|| NormalizeError::InvalidEndTime(end_time_str.clone()))?;

    Ok(PlayEvent {
        track_name: name_or(raw.track_name, UNKNOWN_TRACK),
        artist_name: name_or(raw.artist_name, UNKNOWN_ARTIST),
        end_time,
        ms_played: raw.ms_played.unwrap_or(0),
    })
}

/// Parse one document and normalize its records.
///
/// Returns an error only when the document as a whole is unusable. Bad records
/// are logged, counted in the second tuple element, and skipped.
pub fn normalize_document(
    document: &SourceDocument,
) -> Result<(Vec<PlayEvent>, usize), NormalizeError> {
    let parsed: Value =
        serde_json::from_str(&document.contents).map_err(|source| NormalizeError::InvalidJson {
            origin: document.origin.clone(),
            source,
        })?;

    let Value::Array(records) = parsed else {
        return Err(NormalizeError::NotAnArray {
            origin: document.origin.clone(),
        });
    };

    let mut events = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.iter().enumerate() {
        match normalize_record(record) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Skipping record {} in {}: {}", index, document.origin, e);
                skipped += 1;
            }
        }
    }

    Ok((events, skipped))
}

/// Normalize every document, preserving document and record order.
pub fn normalize_documents(documents: &[SourceDocument]) -> NormalizedHistory {
    let mut history = NormalizedHistory::default();

    for document in documents {
        match normalize_document(document) {
            Ok((events, skipped)) => {
                debug!(
                    "Normalized {} events from {} ({} skipped)",
                    events.len(),
                    document.origin,
                    skipped
                );
                history.events.extend(events);
                history.records_skipped += skipped;
            }
            Err(e) => {
                warn!("Skipping document: {}", e);
                history.documents_skipped += 1;
            }
        }
    }

    history
}
