//! The external genre lookup collaborator.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    #[error("request rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl LookupError {
    /// Rate limits and server errors are worth retrying; anything else is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::RateLimited { .. } | LookupError::Server { .. }
        )
    }
}

/// Access token obtained from the client-credentials exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Best search match for an artist name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistMatch {
    pub id: String,
    pub name: String,
    /// Genres included in the search result, possibly empty.
    pub genres: Vec<String>,
}

/// Genre details for one identifier, from the batch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistDetail {
    pub id: String,
    pub genres: Vec<String>,
}

/// Rate-limited service able to classify artists by genre.
#[async_trait]
pub trait GenreLookup: Send + Sync {
    /// Exchange client credentials for a bearer token.
    async fn exchange_credentials(&self) -> Result<BearerToken, LookupError>;

    /// Search for an artist by name. `Ok(None)` means no match.
    async fn search_artist(
        &self,
        token: &BearerToken,
        name: &str,
    ) -> Result<Option<ArtistMatch>, LookupError>;

    /// Fetch genres for up to one batch of identifiers. The returned list is
    /// positional; unknown identifiers come back as `None`.
    async fn artist_genres(
        &self,
        token: &BearerToken,
        ids: &[String],
    ) -> Result<Vec<Option<ArtistDetail>>, LookupError>;
}
