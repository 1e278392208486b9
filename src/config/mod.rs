mod file_config;

pub use file_config::{CredentialsConfig, FileConfig, JobsConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Feature configs (with defaults)
    pub credentials: CredentialsSettings,
    pub jobs: JobsSettings,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialsSettings {
    pub firecrawl_api_key: Option<String>,
    pub watchmode_api_key: Option<String>,
    pub omdb_api_key: Option<String>,
    pub tmdb_access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobsSettings {
    /// Hours between scheduled runs. Zero makes the job manual-only.
    pub catalog_sync_interval_hours: u64,
    pub source_refresh_interval_hours: u64,
    pub imdb_backfill_interval_hours: u64,
    pub source_refresh_batch_size: usize,
    pub imdb_backfill_batch_size: usize,
    /// Minimum number of scraped catalog rows before the sync job is allowed
    /// to remove stale availability annotations.
    pub removal_floor: usize,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            catalog_sync_interval_hours: 24,
            source_refresh_interval_hours: 12,
            imdb_backfill_interval_hours: 24,
            source_refresh_batch_size: 20,
            imdb_backfill_batch_size: 50,
            removal_floor: 100,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        // Validate db_dir exists
        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let creds_file = file.credentials.unwrap_or_default();
        let credentials = CredentialsSettings {
            firecrawl_api_key: creds_file.firecrawl_api_key,
            watchmode_api_key: creds_file.watchmode_api_key,
            omdb_api_key: creds_file.omdb_api_key,
            tmdb_access_token: creds_file.tmdb_access_token,
        };

        // Job settings - merge file config with defaults
        let jobs_file = file.jobs.unwrap_or_default();
        let jobs_defaults = JobsSettings::default();
        let jobs = JobsSettings {
            catalog_sync_interval_hours: jobs_file
                .catalog_sync_interval_hours
                .unwrap_or(jobs_defaults.catalog_sync_interval_hours),
            source_refresh_interval_hours: jobs_file
                .source_refresh_interval_hours
                .unwrap_or(jobs_defaults.source_refresh_interval_hours),
            imdb_backfill_interval_hours: jobs_file
                .imdb_backfill_interval_hours
                .unwrap_or(jobs_defaults.imdb_backfill_interval_hours),
            source_refresh_batch_size: jobs_file
                .source_refresh_batch_size
                .unwrap_or(jobs_defaults.source_refresh_batch_size),
            imdb_backfill_batch_size: jobs_file
                .imdb_backfill_batch_size
                .unwrap_or(jobs_defaults.imdb_backfill_batch_size),
            removal_floor: jobs_file.removal_floor.unwrap_or(jobs_defaults.removal_floor),
        };

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            credentials,
            jobs,
        })
    }

    pub fn media_db_path(&self) -> PathBuf {
        self.db_dir.join("medialist.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
