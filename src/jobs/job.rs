use std::time::Duration;

use super::context::JobContext;
use crate::sync::RunReport;

/// When a job runs on its own.
#[derive(Debug, Clone, Copy)]
pub enum JobSchedule {
    /// Run at a fixed interval.
    Interval(Duration),
    /// Only runs when triggered through the API.
    Manual,
}

/// Errors surfaced to whoever triggered a job.
#[derive(Debug)]
pub enum JobError {
    NotFound,
    AlreadyRunning,
    ExecutionFailed(String),
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::NotFound => write!(f, "Job not found"),
            JobError::AlreadyRunning => write!(f, "Job is already running"),
            JobError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
        }
    }
}

impl std::error::Error for JobError {}

/// A sync job over the media library.
///
/// Jobs are synchronous; the runner calls `execute` through
/// `spawn_blocking`. A job either completes with a [RunReport], possibly
/// carrying per-record errors it worked through, or fails as a whole with
/// [JobError::ExecutionFailed]. Whatever it managed to persist before a
/// failure stays persisted.
pub trait SyncJob: Send + Sync {
    /// Unique identifier, also the trigger path segment in the API.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// What this job does.
    fn description(&self) -> &'static str;

    /// When this job should run on its own.
    fn schedule(&self) -> JobSchedule;

    /// Runs the job to completion.
    fn execute(&self, ctx: &JobContext) -> Result<RunReport, JobError>;
}
