//! Genre resolution against the durable cache and the lookup service.

use super::lookup::{ArtistMatch, BearerToken, GenreLookup, LookupError};
use super::mapping::GenreMapping;
use super::retry::RetryPolicy;
use super::store::GenreStore;
use crate::history::ArtistTotals;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("credential exchange failed: {0}")]
    Credentials(#[source] LookupError),

    #[error("genre store failure: {0:#}")]
    Store(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Maximum identifier searches in flight at once.
    pub max_concurrency: usize,
    /// Identifiers per batch genre request.
    pub batch_size: usize,
    pub retry: RetryPolicy,
    /// Pause after each artist in sequential mode.
    pub inter_request_delay: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            batch_size: 50,
            retry: RetryPolicy::default(),
            inter_request_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Artists already present in the store.
    pub cached: usize,
    /// Artists sent to the lookup service.
    pub looked_up: usize,
    /// Looked-up artists that ended up with the sentinel genre.
    pub unresolved: usize,
}

#[derive(Debug, Clone)]
pub struct GenreResolution {
    /// Genres for exactly the requested artists.
    pub mapping: GenreMapping,
    pub stats: ResolutionStats,
}

/// Resolves artist genres, querying the lookup service only for artists
/// missing from the store. The store is written at most once per call.
pub struct GenreResolver {
    lookup: Arc<dyn GenreLookup>,
    store: Arc<dyn GenreStore>,
    settings: ResolverSettings,
}

struct Partition {
    mapping: GenreMapping,
    requested: Vec<String>,
    pending: Vec<String>,
}

impl GenreResolver {
    pub fn new(
        lookup: Arc<dyn GenreLookup>,
        store: Arc<dyn GenreStore>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            lookup,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn partition(&self, artists: &ArtistTotals) -> Result<Partition, ResolveError> {
        let mapping = self.store.load().map_err(ResolveError::Store)?;
        let requested: Vec<String> = artists.entries().iter().map(|a| a.name.clone()).collect();
        let pending: Vec<String> = requested
            .iter()
            .filter(|name| !mapping.contains(name))
            .cloned()
            .collect();

        info!(
            "{} artists requested, {} cached, {} need lookup",
            requested.len(),
            requested.len() - pending.len(),
            pending.len()
        );

        Ok(Partition {
            mapping,
            requested,
            pending,
        })
    }

    fn finish(&self, partition: Partition) -> Result<GenreResolution, ResolveError> {
        let Partition {
            mapping,
            requested,
            pending,
        } = partition;

        if !pending.is_empty() {
            self.store.save(&mapping).map_err(ResolveError::Store)?;
        }

        let unresolved = pending
            .iter()
            .filter(|name| mapping.is_unknown(name))
            .count();
        let stats = ResolutionStats {
            cached: requested.len() - pending.len(),
            looked_up: pending.len(),
            unresolved,
        };
        info!(
            "Genre resolution done: {} cached, {} looked up, {} unresolved",
            stats.cached, stats.looked_up, stats.unresolved
        );

        Ok(GenreResolution {
            mapping: mapping.subset(requested.iter().map(String::as_str)),
            stats,
        })
    }

    /// Resolve genres for `artists` using concurrent searches followed by
    /// batched genre fetches.
    pub async fn resolve(&self, artists: &ArtistTotals) -> Result<GenreResolution, ResolveError> {
        let mut partition = self.partition(artists)?;
        if partition.pending.is_empty() {
            return self.finish(partition);
        }

        let token = self
            .lookup
            .exchange_credentials()
            .await
            .map_err(ResolveError::Credentials)?;

        let matches = self.search_all(&token, &partition.pending).await;

        // Several names may resolve to the same identifier
        let mut ids: Vec<String> = Vec::new();
        let mut names_by_id: HashMap<String, Vec<String>> = HashMap::new();
        for name in &partition.pending {
            match matches.get(name) {
                Some(artist) => {
                    let names = names_by_id.entry(artist.id.clone()).or_default();
                    if names.is_empty() {
                        ids.push(artist.id.clone());
                    }
                    names.push(name.clone());
                }
                None => partition.mapping.insert_unknown(name.clone()),
            }
        }

        let batch_size = self.settings.batch_size.max(1);
        let chunk_count = ids.len().div_ceil(batch_size);
        for (index, chunk) in ids.chunks(batch_size).enumerate() {
            let label = format!("genre batch {}/{}", index + 1, chunk_count);
            let result = self
                .settings
                .retry
                .run(&label, || self.lookup.artist_genres(&token, chunk))
                .await;

            match result {
                Ok(details) => {
                    let genres_by_id: HashMap<String, Vec<String>> = details
                        .into_iter()
                        .flatten()
                        .map(|detail| (detail.id, detail.genres))
                        .collect();
                    for id in chunk {
                        let genres = genres_by_id.get(id).cloned().unwrap_or_default();
                        for name in names_by_id.get(id).into_iter().flatten() {
                            partition.mapping.insert(name.clone(), genres.clone());
                        }
                    }
                }
                Err(e) => {
                    warn!("{} failed, marking {} artists unknown: {}", label, chunk.len(), e);
                    for id in chunk {
                        for name in names_by_id.get(id).into_iter().flatten() {
                            partition.mapping.insert_unknown(name.clone());
                        }
                    }
                }
            }
        }

        self.finish(partition)
    }

    /// Search identifiers for every name with bounded concurrency. Names whose
    /// search failed or found nothing are absent from the result.
    async fn search_all(
        &self,
        token: &BearerToken,
        names: &[String],
    ) -> HashMap<String, ArtistMatch> {
        let retry = &self.settings.retry;
        let lookup = &self.lookup;

        stream::iter(names.iter())
            .map(|name| async move {
                let result = retry
                    .run(name, move || lookup.search_artist(token, name))
                    .await;
                match result {
                    Ok(Some(artist)) => Some((name.clone(), artist)),
                    Ok(None) => {
                        warn!("No artist found for {}", name);
                        None
                    }
                    Err(e) => {
                        warn!("Search failed for {}: {}", name, e);
                        None
                    }
                }
            })
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .filter_map(|found| async move { found })
            .collect()
            .await
    }

    /// Resolve genres one artist at a time, taking genres from the best search
    /// match and pausing between artists.
    pub async fn resolve_sequential(
        &self,
        artists: &ArtistTotals,
    ) -> Result<GenreResolution, ResolveError> {
        let mut partition = self.partition(artists)?;
        if partition.pending.is_empty() {
            info!("All artists are already mapped, nothing to look up");
            return self.finish(partition);
        }

        let token = self
            .lookup
            .exchange_credentials()
            .await
            .map_err(ResolveError::Credentials)?;

        let total = partition.pending.len();
        for (index, name) in partition.pending.iter().enumerate() {
            let result = self
                .settings
                .retry
                .run(name, || self.lookup.search_artist(&token, name))
                .await;

            match result {
                Ok(Some(artist)) => partition.mapping.insert(name.clone(), artist.genres),
                Ok(None) => {
                    warn!("No artist found for {}", name);
                    partition.mapping.insert_unknown(name.clone());
                }
                Err(e) => {
                    warn!("Lookup failed for {}: {}", name, e);
                    partition.mapping.insert_unknown(name.clone());
                }
            }

            info!("Processed {}/{}: {}", index + 1, total, name);
            debug!("Sleeping {:?}", self.settings.inter_request_delay);
            tokio::time::sleep(self.settings.inter_request_delay).await;
        }

        self.finish(partition)
    }
}
