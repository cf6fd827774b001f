use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub history_dir: Option<String>,
    pub output_dir: Option<String>,
    pub genre_cache_path: Option<String>,
    pub bucket_days: Option<u32>,
    pub top_n: Option<usize>,

    // Feature configs
    pub insights: Option<InsightsConfig>,
    pub lookup: Option<LookupConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct InsightsConfig {
    pub top_limit: Option<usize>,
    pub holiday_top: Option<usize>,
    pub skip_threshold_ms: Option<i64>,
    pub session_gap_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LookupConfig {
    pub accounts_url: Option<String>,
    pub api_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub batch_size: Option<usize>,
    // Retry settings
    pub max_attempts: Option<u32>,
    pub default_retry_after_secs: Option<u64>,
    pub server_error_backoff_secs: Option<u64>,
    pub inter_request_delay_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
