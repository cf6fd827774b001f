//! Artist genre classification: cache, lookup service, resolution and rollup.

mod lookup;
mod mapping;
mod resolver;
mod retry;
mod rollup;
mod spotify;
mod store;

pub use lookup::{ArtistDetail, ArtistMatch, BearerToken, GenreLookup, LookupError};
pub use mapping::GenreMapping;
pub use resolver::{GenreResolution, GenreResolver, ResolutionStats, ResolveError, ResolverSettings};
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use rollup::{ArtistPlaytime, GenreArtists, GenreRollup};
pub use spotify::{SpotifyLookup, SpotifyLookupConfig, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
pub use store::{GenreStore, JsonFileGenreStore, MemoryGenreStore};
