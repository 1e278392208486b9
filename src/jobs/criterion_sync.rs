//! Reconciles the Criterion Channel catalog against the film library.
//!
//! One run scrapes the catalog page, matches the parsed entries against all
//! stored films, tags matched films with a curated source annotation and,
//! when the scrape looks healthy, removes the annotation from films that
//! have left the catalog.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::context::JobContext;
use super::job::{JobError, JobSchedule, SyncJob};
use crate::providers::CatalogSource;
use crate::store::{FilmPatch, SourceKind, StreamingSource};
use crate::sync::{
    add_manual_source, match_films, parse_catalog_rows, remove_manual_source, RunReport, SyncError,
};

pub const CRITERION_CATALOG_URL: &str = "https://films.criterionchannel.com/";

const CRITERION_SOURCE_ID: i64 = 203;
const CRITERION_SOURCE_NAME: &str = "Criterion Channel";
const CRITERION_NAME_FRAGMENT: &str = "criterion";

pub struct CatalogSyncSettings {
    pub interval: Option<Duration>,
    /// A scrape with fewer entries than this is assumed broken and never
    /// triggers removals.
    pub removal_floor: usize,
}

pub struct CriterionSyncJob {
    catalog: Option<Arc<dyn CatalogSource>>,
    settings: CatalogSyncSettings,
}

impl CriterionSyncJob {
    pub fn new(catalog: Option<Arc<dyn CatalogSource>>, settings: CatalogSyncSettings) -> Self {
        Self { catalog, settings }
    }

    fn curated_source() -> StreamingSource {
        StreamingSource {
            source_id: Some(CRITERION_SOURCE_ID),
            name: CRITERION_SOURCE_NAME.to_string(),
            kind: SourceKind::Sub,
            web_url: None,
        }
    }

    fn run(&self, ctx: &JobContext) -> Result<RunReport, SyncError> {
        let catalog = self
            .catalog
            .as_deref()
            .ok_or(SyncError::MissingConfig("firecrawl_api_key"))?;

        let mut report = RunReport::default();

        info!("Scraping catalog page");
        let markdown = catalog.fetch_markdown()?;
        let entries = parse_catalog_rows(&markdown)?;
        report.scraped = entries.len();

        let films = ctx.store.list_films()?;
        let outcome = match_films(&entries, &films);
        report.matched = outcome.matches.len();
        report.no_match = outcome.unmatched.len();
        info!(
            "Matched {} of {} catalog entries against {} films",
            outcome.matches.len(),
            entries.len(),
            films.len()
        );

        let source = Self::curated_source();
        let mut matched_ids: HashSet<&str> = HashSet::new();
        for matched in &outcome.matches {
            matched_ids.insert(matched.record.id.as_str());
            let updated = match add_manual_source(matched.record, &source, CRITERION_NAME_FRAGMENT)
            {
                Some(updated) => updated,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            let patch = FilmPatch {
                manual_streaming_sources: Some(updated),
                ..Default::default()
            };
            match ctx.store.update_film(&matched.record.id, &patch) {
                Ok(()) => {
                    report.updated += 1;
                    info!("+ tagged {} with {}", matched.record.title, CRITERION_SOURCE_NAME);
                }
                Err(err) => {
                    warn!("Failed to tag {}: {}", matched.record.title, err);
                    report.record_error(&matched.record.title, err);
                }
            }
        }

        if report.scraped < self.settings.removal_floor {
            let reason = format!(
                "scrape returned only {} entries (removal floor is {})",
                report.scraped, self.settings.removal_floor
            );
            info!("Keeping existing annotations: {}", reason);
            report.removal_skipped_reason = Some(reason);
        } else {
            for film in &films {
                if matched_ids.contains(film.id.as_str()) {
                    continue;
                }
                let remaining =
                    match remove_manual_source(film, CRITERION_SOURCE_ID, CRITERION_NAME_FRAGMENT)
                    {
                        Some(remaining) => remaining,
                        None => continue,
                    };
                let patch = FilmPatch {
                    manual_streaming_sources: Some(remaining),
                    ..Default::default()
                };
                match ctx.store.update_film(&film.id, &patch) {
                    Ok(()) => {
                        report.removed += 1;
                        info!("- removed stale {} annotation from {}", CRITERION_SOURCE_NAME, film.title);
                    }
                    Err(err) => {
                        warn!("Failed to untag {}: {}", film.title, err);
                        report.record_error(&film.title, err);
                    }
                }
            }
        }

        info!(
            "Catalog sync done: {} matched, {} updated, {} skipped, {} removed, {} without a match",
            report.matched, report.updated, report.skipped, report.removed, report.no_match
        );
        Ok(report)
    }
}

impl SyncJob for CriterionSyncJob {
    fn id(&self) -> &'static str {
        "criterion_sync"
    }

    fn name(&self) -> &'static str {
        "Criterion catalog sync"
    }

    fn description(&self) -> &'static str {
        "Scrapes the Criterion Channel catalog and reconciles film availability annotations"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MediaItem, MediaStore, MemoryMediaStore};
    use serde_json::json;

    struct FixedCatalog {
        markdown: String,
    }

    impl CatalogSource for FixedCatalog {
        fn fetch_markdown(&self) -> Result<String, SyncError> {
            Ok(self.markdown.clone())
        }
    }

    fn catalog_markdown(rows: &[(&str, Option<i32>)]) -> String {
        let mut markdown = String::from("# Catalog\n\n| | Title | Director | Country | Year |\n");
        for (title, year) in rows {
            let year = year.map(|y| y.to_string()).unwrap_or_default();
            markdown.push_str(&format!(
                "| ![](https://img.example.com/p.jpg) | [{}](https://example.com/f) | Some Director | France | {} |\n",
                title, year
            ));
        }
        markdown
    }

    fn seeded_store(films: &[serde_json::Value]) -> Arc<MemoryMediaStore> {
        let store = Arc::new(MemoryMediaStore::new());
        for film in films {
            store
                .upsert_item(&MediaItem::from_value(film.clone()).unwrap())
                .unwrap();
        }
        store
    }

    fn job_with(markdown: String, removal_floor: usize) -> CriterionSyncJob {
        CriterionSyncJob::new(
            Some(Arc::new(FixedCatalog { markdown })),
            CatalogSyncSettings {
                interval: None,
                removal_floor,
            },
        )
    }

    #[test]
    fn matched_films_get_the_annotation() {
        let store = seeded_store(&[
            json!({"id": "f:1", "type": "film", "title": "The Red Shoes", "year": 1948}),
            json!({"id": "f:2", "type": "film", "title": "Unrelated", "year": 2000}),
        ]);
        let job = job_with(
            catalog_markdown(&[("The Red Shoes", Some(1948)), ("Not In Library", Some(1970))]),
            0,
        );

        let report = job.run(&JobContext::new(store.clone())).unwrap();
        assert_eq!(report.scraped, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.no_match, 1);
        assert!(report.errors.is_empty());

        let film = &store.list_films().unwrap()[0];
        assert_eq!(film.manual_streaming_sources.len(), 1);
        assert_eq!(film.manual_streaming_sources[0].source_id, Some(203));
        assert_eq!(film.manual_streaming_sources[0].name, "Criterion Channel");
    }

    #[test]
    fn second_run_skips_already_tagged_films() {
        let store = seeded_store(&[json!({"id": "f:1", "type": "film", "title": "Walkabout", "year": 1971})]);
        let markdown = catalog_markdown(&[("Walkabout", Some(1971))]);

        let job = job_with(markdown.clone(), 0);
        let ctx = JobContext::new(store.clone());
        let first = job.run(&ctx).unwrap();
        assert_eq!(first.updated, 1);

        let second = job.run(&ctx).unwrap();
        assert_eq!(second.updated, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(store.list_films().unwrap()[0].manual_streaming_sources.len(), 1);
    }

    #[test]
    fn departed_films_lose_the_annotation_when_scrape_is_healthy() {
        let store = seeded_store(&[json!({
            "id": "f:1", "type": "film", "title": "Gone From Catalog", "year": 1960,
            "manual_streaming_sources": [{"source_id": 203, "name": "Criterion Channel", "type": "sub"}]
        })]);
        // 3 entries, none matching; floor of 2 lets removals happen.
        let job = job_with(
            catalog_markdown(&[("A", Some(1)), ("B", Some(2)), ("C", Some(3))]),
            2,
        );

        let report = job.run(&JobContext::new(store.clone())).unwrap();
        assert_eq!(report.removed, 1);
        assert!(report.removal_skipped_reason.is_none());
        assert!(store.list_films().unwrap()[0].manual_streaming_sources.is_empty());
    }

    #[test]
    fn thin_scrape_blocks_the_removal_pass() {
        let store = seeded_store(&[json!({
            "id": "f:1", "type": "film", "title": "Gone From Catalog", "year": 1960,
            "manual_streaming_sources": [{"source_id": 203, "name": "Criterion Channel", "type": "sub"}]
        })]);
        let job = job_with(catalog_markdown(&[("Only Entry", Some(1999))]), 100);

        let report = job.run(&JobContext::new(store.clone())).unwrap();
        assert_eq!(report.removed, 0);
        let reason = report.removal_skipped_reason.unwrap();
        assert!(reason.contains("1 entries"));
        assert!(reason.contains("100"));
        assert_eq!(store.list_films().unwrap()[0].manual_streaming_sources.len(), 1);
    }

    #[test]
    fn provider_fed_source_does_not_block_the_annotation() {
        // The provider feed already lists the service, but the curated
        // annotation lives in the manual list and must not hinge on the
        // volatile provider data.
        let store = seeded_store(&[json!({
            "id": "f:1", "type": "film", "title": "Already Fed", "year": 1980,
            "streaming_sources": [{"source_id": 203, "name": "Criterion Channel", "type": "sub"}]
        })]);
        let job = job_with(catalog_markdown(&[("Already Fed", Some(1980))]), 0);

        let report = job.run(&JobContext::new(store.clone())).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 0);

        let film = &store.list_films().unwrap()[0];
        assert_eq!(film.manual_streaming_sources.len(), 1);
        assert_eq!(film.manual_streaming_sources[0].source_id, Some(203));
    }

    #[test]
    fn matched_film_is_never_a_removal_candidate() {
        let store = seeded_store(&[json!({
            "id": "f:1", "type": "film", "title": "Still Here", "year": 1955,
            "manual_streaming_sources": [{"source_id": 203, "name": "Criterion Channel", "type": "sub"}]
        })]);
        let job = job_with(catalog_markdown(&[("Still Here", Some(1955))]), 1);

        let report = job.run(&JobContext::new(store.clone())).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.removed, 0);
        assert_eq!(store.list_films().unwrap()[0].manual_streaming_sources.len(), 1);
    }

    #[test]
    fn blank_scrape_fails_the_run() {
        let store = seeded_store(&[]);
        let job = job_with("   ".to_string(), 0);
        assert!(matches!(
            job.run(&JobContext::new(store)),
            Err(SyncError::EmptyContent)
        ));
    }

    #[test]
    fn missing_credentials_fail_the_run() {
        let job = CriterionSyncJob::new(
            None,
            CatalogSyncSettings {
                interval: None,
                removal_floor: 100,
            },
        );
        let result = job.execute(&JobContext::new(Arc::new(MemoryMediaStore::new())));
        match result {
            Err(JobError::ExecutionFailed(msg)) => assert!(msg.contains("firecrawl_api_key")),
            other => panic!("unexpected result: {:?}", other.map(|r| r.updated)),
        }
    }
}
