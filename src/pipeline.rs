//! End-to-end analytics run over a normalized history.

use crate::genres::{GenreResolver, GenreRollup, ResolutionStats, ResolveError};
use crate::history::{ArtistTotals, PlayEvent};
use crate::insights::{compute_insights, InsightSettings, ListeningInsights};
use crate::intervals::{cumulative_by_interval, top_by_interval, IntervalSettings, IntervalSnapshot};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const CUMULATIVE_FILE_NAME: &str = "cumulative_for_barchart.json";
pub const TOP_BY_INTERVAL_FILE_NAME: &str = "non_cumulative_songs.json";
pub const ARTISTS_BY_GENRE_FILE_NAME: &str = "artists_by_genre.json";
pub const INSIGHTS_FILE_NAME: &str = "listening_insights.json";

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Genre resolution failed. `partial` still holds every document that does
    /// not depend on genres.
    #[error("{source}")]
    Resolve {
        #[source]
        source: ResolveError,
        partial: Box<AnalyticsReport>,
    },

    #[error("interval aggregation task failed: {0}")]
    Aggregation(#[from] tokio::task::JoinError),
}

/// Documents that need resolved genres.
#[derive(Debug, Clone)]
pub struct GenreReport {
    pub artists_by_genre: GenreRollup,
    pub stats: ResolutionStats,
}

/// Every output document of one run.
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub cumulative: Vec<IntervalSnapshot>,
    pub top_by_interval: Vec<IntervalSnapshot>,
    pub insights: ListeningInsights,
    /// `None` when genre resolution failed; the insights then carry no genre
    /// rankings.
    pub genres: Option<GenreReport>,
}

fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", file_name))?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

impl AnalyticsReport {
    /// Write the documents into `dir`, creating it if needed. The genre
    /// document is skipped when genres were not resolved.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        let mut written = vec![
            write_json(dir, CUMULATIVE_FILE_NAME, &self.cumulative)?,
            write_json(dir, TOP_BY_INTERVAL_FILE_NAME, &self.top_by_interval)?,
        ];
        if let Some(genres) = &self.genres {
            written.push(write_json(
                dir,
                ARTISTS_BY_GENRE_FILE_NAME,
                &genres.artists_by_genre,
            )?);
        }
        written.push(write_json(dir, INSIGHTS_FILE_NAME, &self.insights)?);

        for path in &written {
            info!("Wrote {:?}", path);
        }
        Ok(written)
    }
}

pub struct Pipeline {
    resolver: GenreResolver,
    intervals: IntervalSettings,
    insights: InsightSettings,
}

impl Pipeline {
    pub fn new(
        resolver: GenreResolver,
        intervals: IntervalSettings,
        insights: InsightSettings,
    ) -> Self {
        Self {
            resolver,
            intervals,
            insights,
        }
    }

    /// Run every analysis over `events`.
    ///
    /// Events are stably sorted by end time first, so the first spelling of an
    /// artist is the earliest one in every document. Interval aggregation runs
    /// on the blocking pool while genres resolve; rollup and insights wait for
    /// the resolution.
    pub async fn run(&self, mut events: Vec<PlayEvent>) -> Result<AnalyticsReport, PipelineError> {
        events.sort_by_key(|event| event.end_time);
        let events = Arc::new(events);
        info!("Running analytics over {} play events", events.len());

        let interval_events = events.clone();
        let intervals = self.intervals;
        let aggregation = tokio::task::spawn_blocking(move || {
            (
                cumulative_by_interval(&interval_events, &intervals),
                top_by_interval(&interval_events, &intervals),
            )
        });

        let totals = ArtistTotals::from_events(events.iter());
        let (aggregated, resolution) = tokio::join!(aggregation, self.resolver.resolve(&totals));
        let (cumulative, top_by_interval) = aggregated?;

        let (rollup, resolution) = match resolution {
            Ok(resolution) => (
                GenreRollup::build(&totals, &resolution.mapping),
                Ok(resolution.stats),
            ),
            Err(e) => {
                warn!("Genre resolution failed, genre rankings are unavailable: {}", e);
                (GenreRollup::default(), Err(e))
            }
        };
        let insights = compute_insights(&events, &totals, &rollup, &self.insights);

        info!(
            "Analytics done: {} cumulative buckets, {} snapshot buckets, {} genres",
            cumulative.len(),
            top_by_interval.len(),
            rollup.len()
        );

        let mut report = AnalyticsReport {
            cumulative,
            top_by_interval,
            insights,
            genres: None,
        };
        match resolution {
            Ok(stats) => {
                report.genres = Some(GenreReport {
                    artists_by_genre: rollup,
                    stats,
                });
                Ok(report)
            }
            Err(source) => Err(PipelineError::Resolve {
                source,
                partial: Box::new(report),
            }),
        }
    }
}
