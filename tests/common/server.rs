//! Mock genre lookup service
//!
//! Serves the three endpoints the lookup client uses (token exchange, artist
//! search and batch artist fetch) from an in-memory catalog. Failure modes are
//! configured up front through [`MockSpotifyBuilder`].

use super::constants::*;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone)]
struct MockArtist {
    id: String,
    name: String,
    genres: Vec<String>,
}

impl MockArtist {
    fn to_json(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "genres": self.genres })
    }
}

#[derive(Default)]
struct MockState {
    artists: Vec<MockArtist>,
    reject_credentials: bool,
    /// Batch requests still to answer with 429
    rate_limits_left: AtomicUsize,
    retry_after_secs: u64,
    /// Batch requests still to answer with 503
    server_errors_left: AtomicUsize,
    /// Search requests still to answer with 429
    search_rate_limits_left: AtomicUsize,
    /// Time each search takes to answer
    search_delay: Duration,
    searches_in_flight: AtomicUsize,
    peak_searches_in_flight: AtomicUsize,
    token_requests: AtomicUsize,
    search_requests: AtomicUsize,
    artists_requests: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MockState {
    fn find_by_name(&self, query: &str) -> Option<&MockArtist> {
        let wanted = query.trim().to_lowercase();
        self.artists
            .iter()
            .find(|a| a.name.to_lowercase() == wanted)
    }

    fn find_by_id(&self, id: &str) -> Option<&MockArtist> {
        self.artists.iter().find(|a| a.id == id)
    }
}

/// Tracks a search being served; leaving the scope ends it.
struct InFlight<'a> {
    state: &'a MockState,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a MockState) -> Self {
        let now = state.searches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_searches_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.searches_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn rate_limited(retry_after_secs: u64) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after_secs.to_string())],
    )
        .into_response()
}

/// Takes one unit from `counter` if any is left.
fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TEST_ACCESS_TOKEN))
}

async fn token(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let has_basic_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if state.reject_credentials || !has_basic_auth {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": TEST_ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

async fn search(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.search_requests.fetch_add(1, Ordering::SeqCst);
    let _in_flight = InFlight::enter(&state);
    if !state.search_delay.is_zero() {
        tokio::time::sleep(state.search_delay).await;
    }
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if take_one(&state.search_rate_limits_left) {
        return rate_limited(state.retry_after_secs);
    }

    let query = params.get("q").map(String::as_str).unwrap_or_default();
    let items: Vec<Value> = state
        .find_by_name(query)
        .map(MockArtist::to_json)
        .into_iter()
        .collect();

    Json(json!({ "artists": { "items": items } })).into_response()
}

async fn artists(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.artists_requests.fetch_add(1, Ordering::SeqCst);
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if take_one(&state.rate_limits_left) {
        return rate_limited(state.retry_after_secs);
    }
    if take_one(&state.server_errors_left) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let ids: Vec<&str> = params
        .get("ids")
        .map(|ids| ids.split(',').filter(|id| !id.is_empty()).collect())
        .unwrap_or_default();
    state.batch_sizes.lock().unwrap().push(ids.len());

    let found: Vec<Value> = ids
        .iter()
        .map(|id| {
            state
                .find_by_id(id)
                .map(MockArtist::to_json)
                .unwrap_or(Value::Null)
        })
        .collect();

    Json(json!({ "artists": found })).into_response()
}

pub struct MockSpotifyBuilder {
    state: MockState,
}

impl MockSpotifyBuilder {
    /// Add an artist the search endpoint can find.
    pub fn artist(mut self, name: &str, id: &str, genres: &[&str]) -> Self {
        self.state.artists.push(MockArtist {
            id: id.to_string(),
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        });
        self
    }

    /// Answer the first `times` batch requests with 429 and `retry-after`.
    pub fn rate_limit_batches(mut self, times: usize, retry_after_secs: u64) -> Self {
        self.state.rate_limits_left = AtomicUsize::new(times);
        self.state.retry_after_secs = retry_after_secs;
        self
    }

    /// Answer the first `times` search requests with 429 and `retry-after`.
    pub fn rate_limit_searches(mut self, times: usize, retry_after_secs: u64) -> Self {
        self.state.search_rate_limits_left = AtomicUsize::new(times);
        self.state.retry_after_secs = retry_after_secs;
        self
    }

    /// Hold every search response for `delay`, so concurrent searches overlap.
    pub fn search_delay(mut self, delay: Duration) -> Self {
        self.state.search_delay = delay;
        self
    }

    /// Answer the first `times` batch requests with 503.
    pub fn fail_batches(mut self, times: usize) -> Self {
        self.state.server_errors_left = AtomicUsize::new(times);
        self
    }

    /// Refuse every credential exchange.
    pub fn reject_credentials(mut self) -> Self {
        self.state.reject_credentials = true;
        self
    }

    pub async fn spawn(self) -> MockSpotify {
        let state = Arc::new(self.state);

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/artists", get(artists))
            .with_state(state.clone());

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock server failed");
        });

        MockSpotify {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}

/// Running mock server. Shuts down when dropped.
pub struct MockSpotify {
    /// Base URL for both the accounts and the API endpoints
    pub base_url: String,

    state: Arc<MockState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

#[allow(dead_code)]
impl MockSpotify {
    pub fn builder() -> MockSpotifyBuilder {
        MockSpotifyBuilder {
            state: MockState::default(),
        }
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn search_requests(&self) -> usize {
        self.state.search_requests.load(Ordering::SeqCst)
    }

    pub fn artists_requests(&self) -> usize {
        self.state.artists_requests.load(Ordering::SeqCst)
    }

    /// Total requests over all endpoints.
    pub fn total_requests(&self) -> usize {
        self.token_requests() + self.search_requests() + self.artists_requests()
    }

    /// Highest number of searches being served at the same time.
    pub fn peak_searches_in_flight(&self) -> usize {
        self.state.peak_searches_in_flight.load(Ordering::SeqCst)
    }

    /// Sizes of the batch requests that were answered successfully.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.batch_sizes.lock().unwrap().clone()
    }
}
