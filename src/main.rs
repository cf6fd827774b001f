use anyhow::{Context, Result};
use clap::Parser;
use playstats::config::{AppConfig, CliConfig, FileConfig};
use playstats::genres::{GenreResolver, JsonFileGenreStore, SpotifyLookup};
use playstats::history::load_history_dir;
use playstats::{Pipeline, PipelineError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(name = "playstats")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")))]
#[command(about = "Compute listening analytics from a streaming-history export")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Extracted export directory containing StreamingHistory_music*.json files.
    /// Can also be specified in config file.
    #[clap(value_parser = parse_path)]
    pub history_dir: Option<PathBuf>,

    /// Directory the output documents are written to.
    #[clap(short, long, value_parser = parse_path)]
    pub output_dir: Option<PathBuf>,

    /// Path of the artist genre cache. Defaults to a file in the output directory.
    #[clap(long, value_parser = parse_path)]
    pub genre_cache: Option<PathBuf>,

    /// Width of the snapshot buckets in days.
    #[clap(long, default_value_t = 3)]
    pub bucket_days: u32,

    /// Number of songs kept per snapshot bucket.
    #[clap(long, default_value_t = 10)]
    pub top_n: usize,

    /// Length of the ranked lists in the insights document.
    #[clap(long, default_value_t = 10)]
    pub insights_top: usize,

    /// Client id for the genre lookup service.
    #[clap(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret for the genre lookup service.
    #[clap(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Base URL of the accounts (token) service.
    #[clap(long, default_value = playstats::genres::DEFAULT_ACCOUNTS_URL)]
    pub accounts_url: String,

    /// Base URL of the Web API.
    #[clap(long, default_value = playstats::genres::DEFAULT_API_URL)]
    pub api_url: String,

    /// Maximum artist searches in flight.
    #[clap(long, default_value_t = 10)]
    pub max_concurrency: usize,

    /// Timeout in seconds for lookup requests.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            history_dir: args.history_dir.clone(),
            output_dir: args.output_dir.clone(),
            genre_cache_path: args.genre_cache.clone(),
            bucket_days: args.bucket_days,
            top_n: args.top_n,
            insights_top: args.insights_top,
            client_id: args.client_id.clone(),
            client_secret: args.client_secret.clone(),
            accounts_url: args.accounts_url.clone(),
            api_url: args.api_url.clone(),
            max_concurrency: args.max_concurrency,
            request_timeout_sec: args.request_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  history_dir: {:?}", app_config.history_dir);
    info!("  output_dir: {:?}", app_config.output_dir);
    info!("  genre_cache: {:?}", app_config.genre_cache_path);
    info!(
        "  buckets: {} days, top {}",
        app_config.intervals.bucket_days(),
        app_config.intervals.top_n()
    );

    let history = load_history_dir(&app_config.history_dir)?;
    if history.events.is_empty() {
        info!("No play events found, nothing to compute");
    }

    let lookup = SpotifyLookup::new(app_config.lookup.spotify_config())?;
    let store = JsonFileGenreStore::new(&app_config.genre_cache_path);
    let resolver = GenreResolver::new(
        Arc::new(lookup),
        Arc::new(store),
        app_config.lookup.resolver.clone(),
    );
    let pipeline = Pipeline::new(resolver, app_config.intervals, app_config.insights.clone());

    let report = match pipeline.run(history.events).await {
        Ok(report) => report,
        Err(PipelineError::Resolve { source, partial }) => {
            // Documents that do not need genres are still worth keeping
            partial.write_to_dir(&app_config.output_dir)?;
            return Err(source).context("Genre resolution failed, artists_by_genre.json not written");
        }
        Err(e) => return Err(e.into()),
    };
    report.write_to_dir(&app_config.output_dir)?;

    info!(
        "Done: {} plays, {} listened",
        report.insights.summary.total_plays,
        report.insights.summary.total_playtime.readable
    );
    if let Some(genres) = &report.genres {
        info!(
            "Genres: {} artists cached, {} looked up ({} unresolved)",
            genres.stats.cached, genres.stats.looked_up, genres.stats.unresolved
        );
    }
    Ok(())
}
