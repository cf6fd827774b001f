mod file_config;

pub use file_config::{FileConfig, InsightsConfig, LookupConfig};

use crate::genres::{
    ResolverSettings, RetryPolicy, SpotifyLookupConfig, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL,
};
use crate::insights::InsightSettings;
use crate::intervals::IntervalSettings;
use anyhow::{bail, Result};
use chrono::TimeDelta;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Upper bound accepted by the batch artists endpoint.
pub const MAX_BATCH_SIZE: usize = 50;

pub const GENRE_CACHE_FILE_NAME: &str = "artist_genre_mapping.json";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub history_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub genre_cache_path: Option<PathBuf>,
    pub bucket_days: u32,
    pub top_n: usize,
    pub insights_top: usize,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub accounts_url: String,
    pub api_url: String,
    pub max_concurrency: usize,
    pub request_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            history_dir: None,
            output_dir: None,
            genre_cache_path: None,
            bucket_days: 3,
            top_n: 10,
            insights_top: 10,
            client_id: None,
            client_secret: None,
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_concurrency: 10,
            request_timeout_sec: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenreLookupSettings {
    pub accounts_url: String,
    pub api_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub request_timeout: Duration,
    pub resolver: ResolverSettings,
}

impl GenreLookupSettings {
    /// Client configuration for the lookup service.
    ///
    /// Missing credentials are not an error here: a run whose artists are all
    /// cached never exchanges them.
    pub fn spotify_config(&self) -> SpotifyLookupConfig {
        if self.client_id.is_none() || self.client_secret.is_none() {
            warn!("Lookup client credentials not set; uncached artists cannot be resolved");
        }
        SpotifyLookupConfig {
            accounts_url: self.accounts_url.clone(),
            api_url: self.api_url.clone(),
            client_id: self.client_id.clone().unwrap_or_default(),
            client_secret: self.client_secret.clone().unwrap_or_default(),
            request_timeout: self.request_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub history_dir: PathBuf,
    pub output_dir: PathBuf,
    pub genre_cache_path: PathBuf,
    pub intervals: IntervalSettings,
    pub insights: InsightSettings,
    pub lookup: GenreLookupSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let history_dir = file
            .history_dir
            .map(PathBuf::from)
            .or_else(|| cli.history_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "history_dir must be specified via --history-dir or in config file"
                )
            })?;

        if !history_dir.exists() {
            bail!("History directory does not exist: {:?}", history_dir);
        }
        if !history_dir.is_dir() {
            bail!("history_dir is not a directory: {:?}", history_dir);
        }

        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| cli.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let genre_cache_path = file
            .genre_cache_path
            .map(PathBuf::from)
            .or_else(|| cli.genre_cache_path.clone())
            .unwrap_or_else(|| output_dir.join(GENRE_CACHE_FILE_NAME));

        let bucket_days = file.bucket_days.unwrap_or(cli.bucket_days);
        let top_n = file.top_n.unwrap_or(cli.top_n);
        let intervals = match IntervalSettings::new(bucket_days, top_n) {
            Ok(settings) => settings,
            Err(e) => bail!("Invalid interval settings: {}", e),
        };

        // Insight settings - merge file config with defaults
        let insights_file = file.insights.unwrap_or_default();
        let defaults = InsightSettings::default();
        let insights = InsightSettings {
            top_limit: insights_file.top_limit.unwrap_or(cli.insights_top),
            holiday_top: insights_file.holiday_top.unwrap_or(defaults.holiday_top),
            skip_threshold_ms: insights_file
                .skip_threshold_ms
                .unwrap_or(defaults.skip_threshold_ms),
            session_gap: insights_file
                .session_gap_minutes
                .map(TimeDelta::minutes)
                .unwrap_or(defaults.session_gap),
            ..defaults
        };
        if insights.top_limit == 0 {
            bail!("insights top_limit must be at least 1");
        }
        if insights.session_gap <= TimeDelta::zero() {
            bail!("session_gap_minutes must be positive");
        }

        // Lookup settings - TOML [lookup] section takes precedence over CLI args
        let lookup_file = file.lookup.unwrap_or_default();
        let retry_defaults = RetryPolicy::default();
        let resolver_defaults = ResolverSettings::default();
        let resolver = ResolverSettings {
            max_concurrency: lookup_file.max_concurrency.unwrap_or(cli.max_concurrency),
            batch_size: lookup_file
                .batch_size
                .unwrap_or(resolver_defaults.batch_size),
            retry: RetryPolicy {
                max_attempts: lookup_file
                    .max_attempts
                    .unwrap_or(retry_defaults.max_attempts),
                default_rate_limit_wait: lookup_file
                    .default_retry_after_secs
                    .map(Duration::from_secs)
                    .unwrap_or(retry_defaults.default_rate_limit_wait),
                server_error_wait: lookup_file
                    .server_error_backoff_secs
                    .map(Duration::from_secs)
                    .unwrap_or(retry_defaults.server_error_wait),
            },
            inter_request_delay: lookup_file
                .inter_request_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(resolver_defaults.inter_request_delay),
        };

        if resolver.max_concurrency == 0 {
            bail!("max_concurrency must be at least 1");
        }
        if resolver.batch_size == 0 || resolver.batch_size > MAX_BATCH_SIZE {
            bail!("batch_size must be between 1 and {}", MAX_BATCH_SIZE);
        }
        if resolver.retry.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }

        let lookup = GenreLookupSettings {
            accounts_url: lookup_file
                .accounts_url
                .unwrap_or_else(|| cli.accounts_url.clone()),
            api_url: lookup_file.api_url.unwrap_or_else(|| cli.api_url.clone()),
            client_id: lookup_file.client_id.or_else(|| cli.client_id.clone()),
            client_secret: lookup_file
                .client_secret
                .or_else(|| cli.client_secret.clone()),
            request_timeout: Duration::from_secs(
                lookup_file
                    .request_timeout_sec
                    .unwrap_or(cli.request_timeout_sec),
            ),
            resolver,
        };

        Ok(Self {
            history_dir,
            output_dir,
            genre_cache_path,
            intervals,
            insights,
            lookup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_history(dir: &TempDir) -> CliConfig {
        CliConfig {
            history_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            history_dir: Some(temp_dir.path().to_path_buf()),
            output_dir: Some(PathBuf::from("/out")),
            genre_cache_path: None,
            bucket_days: 7,
            top_n: 5,
            insights_top: 15,
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            accounts_url: "http://accounts".to_string(),
            api_url: "http://api".to_string(),
            max_concurrency: 4,
            request_timeout_sec: 12,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.history_dir, temp_dir.path());
        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(
            config.genre_cache_path,
            PathBuf::from("/out").join(GENRE_CACHE_FILE_NAME)
        );
        assert_eq!(config.intervals.bucket_days(), 7);
        assert_eq!(config.intervals.top_n(), 5);
        assert_eq!(config.insights.top_limit, 15);
        assert_eq!(config.lookup.client_id.as_deref(), Some("id"));
        assert_eq!(config.lookup.accounts_url, "http://accounts");
        assert_eq!(config.lookup.request_timeout, Duration::from_secs(12));
        assert_eq!(config.lookup.resolver.max_concurrency, 4);
        assert_eq!(config.lookup.resolver.batch_size, 50);
        assert_eq!(config.lookup.resolver.retry, RetryPolicy::default());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            history_dir: Some(PathBuf::from("/should/be/overridden")),
            bucket_days: 3,
            top_n: 10,
            max_concurrency: 10,
            client_id: Some("cli-id".to_string()),
            ..Default::default()
        };

        let file_config = FileConfig {
            history_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            bucket_days: Some(1),
            insights: Some(InsightsConfig {
                session_gap_minutes: Some(30),
                ..Default::default()
            }),
            lookup: Some(LookupConfig {
                max_concurrency: Some(2),
                max_attempts: Some(3),
                server_error_backoff_secs: Some(1),
                inter_request_delay_ms: Some(100),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.history_dir, temp_dir.path());
        assert_eq!(config.intervals.bucket_days(), 1);
        assert_eq!(config.insights.session_gap, TimeDelta::minutes(30));
        assert_eq!(config.lookup.resolver.max_concurrency, 2);
        assert_eq!(config.lookup.resolver.retry.max_attempts, 3);
        assert_eq!(
            config.lookup.resolver.retry.server_error_wait,
            Duration::from_secs(1)
        );
        assert_eq!(
            config.lookup.resolver.inter_request_delay,
            Duration::from_millis(100)
        );
        // CLI value used when TOML doesn't specify
        assert_eq!(config.intervals.top_n(), 10);
        assert_eq!(config.lookup.client_id.as_deref(), Some("cli-id"));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_resolve_missing_history_dir_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("history_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_history_dir_error() {
        let cli = CliConfig {
            history_dir: Some(PathBuf::from("/nonexistent/export/dir")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_history_dir_not_directory_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("file.json");
        std::fs::write(&file_path, "[]").unwrap();

        let cli = CliConfig {
            history_dir: Some(file_path),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_resolve_rejects_zero_bucket_days_and_top_n() {
        let temp_dir = TempDir::new().unwrap();

        let cli = CliConfig {
            bucket_days: 0,
            ..cli_with_history(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());

        let cli = CliConfig {
            top_n: 0,
            ..cli_with_history(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_rejects_oversized_batch() {
        let temp_dir = TempDir::new().unwrap();
        let file_config = FileConfig {
            lookup: Some(LookupConfig {
                batch_size: Some(51),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli_with_history(&temp_dir), Some(file_config));
        assert!(result.unwrap_err().to_string().contains("batch_size"));
    }

    #[test]
    fn test_resolve_rejects_zero_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            max_concurrency: 0,
            ..cli_with_history(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_spotify_config_without_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_history(&temp_dir), None).unwrap();
        let spotify = config.lookup.spotify_config();
        assert_eq!(spotify.client_id, "");
        assert_eq!(spotify.api_url, DEFAULT_API_URL);
    }
}
