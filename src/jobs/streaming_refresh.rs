//! Re-pulls provider streaming availability for the stalest films.
//!
//! Works through a small batch per run so a big library spreads its API
//! usage over many runs instead of spending the whole quota at once.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::context::JobContext;
use super::job::{JobError, JobSchedule, SyncJob};
use crate::providers::StreamingSourceProvider;
use crate::store::FilmPatch;
use crate::sync::{provider_sources_changed, RunReport, SyncError};

pub struct SourceRefreshSettings {
    pub interval: Option<Duration>,
    pub batch_size: usize,
}

pub struct StreamingRefreshJob {
    provider: Option<Arc<dyn StreamingSourceProvider>>,
    settings: SourceRefreshSettings,
}

impl StreamingRefreshJob {
    pub fn new(
        provider: Option<Arc<dyn StreamingSourceProvider>>,
        settings: SourceRefreshSettings,
    ) -> Self {
        Self { provider, settings }
    }

    fn run(&self, ctx: &JobContext) -> Result<RunReport, SyncError> {
        let provider = self
            .provider
            .as_deref()
            .ok_or(SyncError::MissingConfig("watchmode_api_key"))?;

        let mut report = RunReport::default();
        let films = ctx
            .store
            .films_needing_source_refresh(self.settings.batch_size)?;
        info!("Refreshing streaming sources for {} films", films.len());

        for film in &films {
            let external_id = match film.external_id.as_deref() {
                Some(id) => id,
                None => continue,
            };

            let fresh = match provider.streaming_sources(external_id) {
                Ok(sources) => sources,
                Err(SyncError::RateLimited) => {
                    warn!("Rate limited while refreshing {}, stopping the batch", film.title);
                    report.record_error(&film.title, "rate limited");
                    break;
                }
                Err(err) => {
                    warn!("Failed to refresh {}: {}", film.title, err);
                    report.record_error(&film.title, err);
                    continue;
                }
            };

            let changed = provider_sources_changed(&film.streaming_sources, &fresh);
            // The sync timestamp is always advanced, an unchanged film still
            // goes to the back of the refresh queue.
            let patch = FilmPatch {
                streaming_sources: Some(fresh),
                sources_last_synced: Some(Utc::now()),
                ..Default::default()
            };
            match ctx.store.update_film(&film.id, &patch) {
                Ok(()) => {
                    if changed {
                        report.refreshed += 1;
                        info!("~ {} has a new set of streaming sources", film.title);
                    } else {
                        report.unchanged += 1;
                        debug!("= {} unchanged", film.title);
                    }
                }
                Err(err) => {
                    warn!("Failed to store refreshed sources for {}: {}", film.title, err);
                    report.record_error(&film.title, err);
                }
            }
        }

        info!(
            "Source refresh done: {} refreshed, {} unchanged, {} errors",
            report.refreshed,
            report.unchanged,
            report.errors.len()
        );
        Ok(report)
    }
}

impl SyncJob for StreamingRefreshJob {
    fn id(&self) -> &'static str {
        "streaming_refresh"
    }

    fn name(&self) -> &'static str {
        "Streaming source refresh"
    }

    fn description(&self) -> &'static str {
        "Re-pulls provider streaming availability for the films synced longest ago"
    }

    fn schedule(&self) -> JobSchedule {
        match self.settings.interval {
            Some(interval) => JobSchedule::Interval(interval),
            None => JobSchedule::Manual,
        }
    }

    fn execute(&self, ctx: &JobContext) -> Result<RunReport, JobError> {
        self.run(ctx)
            .map_err(|err| JobError::ExecutionFailed(err.to_string()))
    }
}
