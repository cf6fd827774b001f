//! HTTP client for a Spotify-compatible Web API.

use super::lookup::{ArtistDetail, ArtistMatch, BearerToken, GenreLookup, LookupError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";

#[derive(Debug, Clone)]
pub struct SpotifyLookupConfig {
    pub accounts_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub request_timeout: Duration,
}

/// [`GenreLookup`] backed by the Spotify Web API.
#[derive(Clone)]
pub struct SpotifyLookup {
    client: Client,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    artists: Option<ArtistPage>,
}

#[derive(Deserialize)]
struct ArtistPage {
    #[serde(default)]
    items: Vec<ArtistObject>,
}

#[derive(Deserialize)]
struct ArtistObject {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Deserialize)]
struct ArtistsResponse {
    #[serde(default)]
    artists: Vec<Option<ArtistObject>>,
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        LookupError::Transport(e.to_string())
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map a non-success status to the matching [`LookupError`].
async fn check_status(response: Response) -> Result<Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LookupError::RateLimited {
            retry_after: parse_retry_after(response.headers()),
        });
    }
    if status.is_server_error() {
        return Err(LookupError::Server {
            status: status.as_u16(),
        });
    }
    let body = response.text().await.unwrap_or_default();
    Err(LookupError::Rejected {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, LookupError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| LookupError::Decode(e.to_string()))
}

impl SpotifyLookup {
    pub fn new(config: SpotifyLookupConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            accounts_url: config.accounts_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            client_secret: config.client_secret,
        })
    }
}

#[async_trait]
impl GenreLookup for SpotifyLookup {
    async fn exchange_credentials(&self) -> Result<BearerToken, LookupError> {
        let url = format!("{}/api/token", self.accounts_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = decode(check_status(response).await?).await?;
        Ok(BearerToken(token.access_token))
    }

    async fn search_artist(
        &self,
        token: &BearerToken,
        name: &str,
    ) -> Result<Option<ArtistMatch>, LookupError> {
        let url = format!("{}/v1/search", self.api_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .query(&[("q", name), ("type", "artist"), ("limit", "1")])
            .send()
            .await?;

        let body: SearchResponse = decode(check_status(response).await?).await?;
        let best = body
            .artists
            .and_then(|page| page.items.into_iter().next())
            .map(|artist| ArtistMatch {
                id: artist.id,
                name: artist.name,
                genres: artist.genres,
            });
        Ok(best)
    }

    async fn artist_genres(
        &self,
        token: &BearerToken,
        ids: &[String],
    ) -> Result<Vec<Option<ArtistDetail>>, LookupError> {
        let url = format!("{}/v1/artists", self.api_url);
        let joined = ids.join(",");
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .query(&[("ids", joined.as_str())])
            .send()
            .await?;

        let body: ArtistsResponse = decode(check_status(response).await?).await?;
        Ok(body
            .artists
            .into_iter()
            .map(|artist| {
                artist.map(|a| ArtistDetail {
                    id: a.id,
                    genres: a.genres,
                })
            })
            .collect())
    }
}
