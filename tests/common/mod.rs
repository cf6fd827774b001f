//! Common test infrastructure
//!
//! End-to-end tests spawn a [`MockSpotify`] server and point the real HTTP
//! lookup client at it. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{MockSpotify, resolver_for};
//!
//! #[tokio::test]
//! async fn test_resolve() {
//!     let server = MockSpotify::builder().artist("Muse", "id-muse", &["rock"]).spawn().await;
//!     let store = std::sync::Arc::new(playstats::genres::MemoryGenreStore::new());
//!     let resolver = resolver_for(&server, store);
//! }
//! ```

mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    artist_totals, fast_settings, lookup_for, play_record, resolver_for, write_history_file,
};
pub use server::{MockSpotify, MockSpotifyBuilder};
