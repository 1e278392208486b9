//! Background sync jobs and their scheduling.
//!
//! Jobs are synchronous and run one record at a time; the runner moves them
//! onto a blocking thread and guards against the same job overlapping
//! itself. A manual trigger through the HTTP API waits for the run and gets
//! the full report back.

mod context;
mod criterion_sync;
mod imdb_backfill;
mod job;
mod runner;
mod scheduler;
mod streaming_refresh;

pub use context::JobContext;
pub use criterion_sync::{CatalogSyncSettings, CriterionSyncJob, CRITERION_CATALOG_URL};
pub use imdb_backfill::{ImdbBackfillJob, ImdbBackfillSettings};
pub use job::{JobError, JobSchedule, SyncJob};
pub use runner::{CompletedRun, JobInfo, JobRunner, ScheduleInfo};
pub use scheduler::run_scheduler;
pub use streaming_refresh::{SourceRefreshSettings, StreamingRefreshJob};
