//! Genre Mapping Tool
//!
//! Grows the artist genre cache from a streaming-history export, looking up
//! one artist at a time with a pause between requests.

use anyhow::Result;
use clap::Parser;
use playstats::config::{AppConfig, CliConfig, FileConfig};
use playstats::genres::{GenreResolver, JsonFileGenreStore, SpotifyLookup};
use playstats::history::{load_history_dir, ArtistTotals};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-genre-mapping")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")))]
#[command(about = "Build or extend the artist genre cache, one artist at a time")]
struct Args {
    /// Extracted export directory containing StreamingHistory_music*.json files
    #[arg(value_name = "HISTORY_DIR")]
    history_dir: Option<PathBuf>,

    /// Path of the artist genre cache to create or extend
    #[arg(long, default_value = "artist_genre_mapping.json")]
    genre_cache: PathBuf,

    /// Path to TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Client id for the genre lookup service
    #[arg(long, env = "CLIENT_ID")]
    client_id: Option<String>,

    /// Client secret for the genre lookup service
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Pause after each artist, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Genre Mapping Tool");
    info!("==================");

    let file_config = match &args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        history_dir: args.history_dir.clone(),
        genre_cache_path: Some(args.genre_cache.clone()),
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
        ..Default::default()
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("History directory: {}", app_config.history_dir.display());
    info!("Genre cache: {}", app_config.genre_cache_path.display());

    let history = load_history_dir(&app_config.history_dir)?;
    let artists = ArtistTotals::from_events(&history.events);
    info!("Total unique artists found in data: {}", artists.len());

    let mut settings = app_config.lookup.resolver.clone();
    if let Some(delay_ms) = args.delay_ms {
        settings.inter_request_delay = Duration::from_millis(delay_ms);
    }

    let lookup = SpotifyLookup::new(app_config.lookup.spotify_config())?;
    let store = JsonFileGenreStore::new(&app_config.genre_cache_path);
    let resolver = GenreResolver::new(Arc::new(lookup), Arc::new(store), settings);

    let resolution = resolver.resolve_sequential(&artists).await?;

    info!("");
    info!("Mapping complete:");
    info!("  Cached artists: {}", resolution.stats.cached);
    info!("  Looked up: {}", resolution.stats.looked_up);
    info!("  Unknown genre: {}", resolution.stats.unresolved);

    Ok(())
}
