use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use medialist_server::config;
use medialist_server::jobs::{
    run_scheduler, CatalogSyncSettings, CriterionSyncJob, ImdbBackfillJob, ImdbBackfillSettings,
    JobContext, JobRunner, SourceRefreshSettings, StreamingRefreshJob, CRITERION_CATALOG_URL,
};
use medialist_server::providers::{
    CatalogSource, FirecrawlScraper, ImdbResolver, OmdbClient, StreamingSourceProvider, TmdbClient,
    WatchmodeClient,
};
use medialist_server::server::{run_server, RequestsLoggingLevel};
use medialist_server::store::SqliteMediaStore;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing the media database file (medialist.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
        }
    }
}

fn interval_from_hours(hours: u64) -> Option<Duration> {
    if hours == 0 {
        None
    } else {
        Some(Duration::from_secs(hours * 60 * 60))
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
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);

    // Opening the store creates the database file on first run.
    let store = Arc::new(SqliteMediaStore::new(app_config.media_db_path())?);

    // Build the provider clients the configured credentials allow. Jobs with
    // a missing client stay registered and report the missing key when run.
    let creds = &app_config.credentials;

    let catalog: Option<Arc<dyn CatalogSource>> = match &creds.firecrawl_api_key {
        Some(key) => Some(Arc::new(FirecrawlScraper::new(key, CRITERION_CATALOG_URL)?)),
        None => {
            info!("No firecrawl_api_key configured, catalog sync is disabled");
            None
        }
    };

    let streaming_provider: Option<Arc<dyn StreamingSourceProvider>> =
        match &creds.watchmode_api_key {
            Some(key) => Some(Arc::new(WatchmodeClient::new(key)?)),
            None => {
                info!("No watchmode_api_key configured, streaming refresh is disabled");
                None
            }
        };

    let mut resolvers: Vec<Arc<dyn ImdbResolver>> = Vec::new();
    if let Some(key) = &creds.omdb_api_key {
        resolvers.push(Arc::new(OmdbClient::new(key)?));
    }
    if let Some(token) = &creds.tmdb_access_token {
        resolvers.push(Arc::new(TmdbClient::new(token)?));
    }
    if resolvers.is_empty() {
        info!("No IMDb resolver credentials configured, IMDb backfill is disabled");
    }

    // Set up job runner and scheduler
    let shutdown_token = CancellationToken::new();
    let mut runner = JobRunner::new(JobContext::new(store.clone()));

    let jobs_config = &app_config.jobs;
    runner.register(Arc::new(CriterionSyncJob::new(
        catalog,
        CatalogSyncSettings {
            interval: interval_from_hours(jobs_config.catalog_sync_interval_hours),
            removal_floor: jobs_config.removal_floor,
        },
    )));
    runner.register(Arc::new(StreamingRefreshJob::new(
        streaming_provider,
        SourceRefreshSettings {
            interval: interval_from_hours(jobs_config.source_refresh_interval_hours),
            batch_size: jobs_config.source_refresh_batch_size,
        },
    )));
    runner.register(Arc::new(ImdbBackfillJob::new(
        resolvers,
        ImdbBackfillSettings {
            interval: interval_from_hours(jobs_config.imdb_backfill_interval_hours),
            batch_size: jobs_config.imdb_backfill_batch_size,
        },
    )));
    let runner = Arc::new(runner);

    info!("Ready to serve at port {}!", app_config.port);

    // Run HTTP server and job scheduler concurrently
    tokio::select! {
        result = run_server(
            store,
            runner.clone(),
            app_config.logging_level.clone(),
            app_config.port,
            app_config.frontend_dir_path.clone(),
        ) => {
            info!("HTTP server stopped: {:?}", result);
            shutdown_token.cancel();
            result
        },
        _ = run_scheduler(runner.clone(), shutdown_token.clone()) => {
            info!("Scheduler stopped");
            Ok(())
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            // Give the scheduler a moment to shut down gracefully
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        }
    }
}
