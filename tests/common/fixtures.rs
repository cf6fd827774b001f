//! Helpers for building history exports and resolvers in tests
#![allow(dead_code)]

use super::constants::*;
use super::server::MockSpotify;
use playstats::genres::{
    GenreResolver, GenreStore, ResolverSettings, RetryPolicy, SpotifyLookup, SpotifyLookupConfig,
};
use playstats::history::ArtistTotals;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// One raw export record in the `StreamingHistory_music_*.json` layout.
pub fn play_record(end_time: &str, artist: &str, track: &str, ms_played: i64) -> Value {
    json!({
        "endTime": end_time,
        "artistName": artist,
        "trackName": track,
        "msPlayed": ms_played,
    })
}

/// Write `records` as a JSON array to `dir/relative`, creating parents.
pub fn write_history_file(dir: &Path, relative: &str, records: &[Value]) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    let json = serde_json::to_string_pretty(records).expect("Failed to serialize fixture");
    std::fs::write(&path, json).expect("Failed to write fixture");
    path
}

/// Totals where every artist has the same playtime, in the given order.
pub fn artist_totals<S: AsRef<str>>(names: &[S]) -> ArtistTotals {
    let mut totals = ArtistTotals::default();
    for name in names {
        totals.add(name.as_ref(), 60_000);
    }
    totals
}

/// Resolver settings with short waits so retry paths stay quick.
pub fn fast_settings() -> ResolverSettings {
    ResolverSettings {
        max_concurrency: 4,
        batch_size: 50,
        retry: RetryPolicy {
            max_attempts: 3,
            default_rate_limit_wait: Duration::from_millis(50),
            server_error_wait: Duration::from_millis(50),
        },
        inter_request_delay: Duration::from_millis(5),
    }
}

pub fn lookup_for(server: &MockSpotify) -> SpotifyLookup {
    SpotifyLookup::new(SpotifyLookupConfig {
        accounts_url: server.base_url.clone(),
        api_url: server.base_url.clone(),
        client_id: TEST_CLIENT_ID.to_string(),
        client_secret: TEST_CLIENT_SECRET.to_string(),
        request_timeout: Duration::from_secs(10),
    })
    .expect("Failed to build lookup client")
}

pub fn resolver_for(server: &MockSpotify, store: Arc<dyn GenreStore>) -> GenreResolver {
    GenreResolver::new(Arc::new(lookup_for(server)), store, fast_settings())
}
