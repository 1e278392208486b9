use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,

    // Feature configs
    pub credentials: Option<CredentialsConfig>,
    pub jobs: Option<JobsConfig>,
}

/// API keys for the third-party services the sync jobs talk to. Every key is
/// optional, a missing one disables the jobs that need it.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CredentialsConfig {
    pub firecrawl_api_key: Option<String>,
    pub watchmode_api_key: Option<String>,
    pub omdb_api_key: Option<String>,
    pub tmdb_access_token: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct JobsConfig {
    pub catalog_sync_interval_hours: Option<u64>,
    pub source_refresh_interval_hours: Option<u64>,
    pub imdb_backfill_interval_hours: Option<u64>,
    pub source_refresh_batch_size: Option<usize>,
    pub imdb_backfill_batch_size: Option<usize>,
    pub removal_floor: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
