//! Fills in missing IMDb ids by asking the configured resolvers in order.
//!
//! Resolvers are tried one after the other and the first positive answer
//! wins, so a cheap primary lookup can be backed by a broader secondary one.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::context::JobContext;
use super::job::{JobError, JobSchedule, SyncJob};
use crate::providers::ImdbResolver;
use crate::store::{FilmPatch, FilmRecord};
use crate::sync::{RunReport, SyncError};

pub struct ImdbBackfillSettings {
    pub interval: Option<Duration>,
    pub batch_size: usize,
}

pub struct ImdbBackfillJob {
    resolvers: Vec<Arc<dyn ImdbResolver>>,
    settings: ImdbBackfillSettings,
}

impl ImdbBackfillJob {
    pub fn new(resolvers: Vec<Arc<dyn ImdbResolver>>, settings: ImdbBackfillSettings) -> Self {
        Self { resolvers, settings }
    }

    /// Asks each resolver in turn. A lookup error aborts the chain for this
    /// film so a flaky resolver cannot hand the win to the next one.
    fn resolve(&self, film: &FilmRecord) -> Result<Option<(String, &'static str)>, SyncError> {
        for resolver in &self.resolvers {
            if let Some(imdb_id) = resolver.resolve_imdb_id(&film.title, film.year)? {
                return Ok(Some((imdb_id, resolver.provider_name())));
            }
        }
        Ok(None)
    }

    fn run(&self, ctx: &JobContext) -> Result<RunReport, SyncError> {
        if self.resolvers.is_empty() {
            return Err(SyncError::MissingConfig("omdb_api_key or tmdb_access_token"));
        }

        let mut report = RunReport::default();
        let films = ctx.store.films_missing_imdb_id(self.settings.batch_size)?;
        info!("Backfilling IMDb ids for {} films", films.len());

        for film in &films {
            match self.resolve(film) {
                Ok(Some((imdb_id, provider))) => {
                    let patch = FilmPatch {
                        imdb_id: Some(imdb_id.clone()),
                        external_url: Some(format!("https://www.imdb.com/title/{}", imdb_id)),
                        ..Default::default()
                    };
                    match ctx.store.update_film(&film.id, &patch) {
                        Ok(()) => {
                            report.updated += 1;
                            info!("+ {} -> {} [{}]", film.title, imdb_id, provider);
                        }
                        Err(err) => {
                            warn!("Failed to store IMDb id for {}: {}", film.title, err);
                            report.record_error(&film.title, err);
                        }
                    }
                }
                Ok(None) => {
                    report.no_match += 1;
                    debug!("? no IMDb id found for {}", film.title);
                }
                Err(err) => {
                    warn!("IMDb lookup failed for {}: {}", film.title, err);
                    report.record_error(&film.title, err);
                }
            }
        }

        info!(
            "IMDb backfill done: {} updated, {} without a match, {} errors",
            report.updated,
            report.no_match,
            report.errors.len()
        );
        Ok(report)
    }
}

impl SyncJob for ImdbBackfillJob {
    fn id(&self) -> &'static str {
        "imdb_backfill"
    }

    fn name(&self) -> &'static str {
        "IMDb id backfill"
    }

    fn description(&self) -> &'static str {
        "Looks up IMDb ids for films that do not have one yet"
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
