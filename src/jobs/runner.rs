use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};

use super::context::JobContext;
use super::job::{JobError, JobSchedule, SyncJob};
use crate::sync::RunReport;

/// Holds the registered jobs and executes them one run at a time.
///
/// A job never overlaps itself: triggering a running job answers
/// [JobError::AlreadyRunning]. Distinct jobs may run side by side, they
/// own disjoint fields of the film documents.
pub struct JobRunner {
    jobs: Vec<Arc<dyn SyncJob>>,
    running: Arc<Mutex<HashSet<String>>>,
    context: JobContext,
}

/// Listing entry for the jobs API.
#[derive(Debug, Serialize)]
pub struct JobInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub schedule: ScheduleInfo,
    pub is_running: bool,
}

#[derive(Debug, Serialize)]
pub struct ScheduleInfo {
    #[serde(rename = "type")]
    pub schedule_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

/// Outcome of one finished run.
#[derive(Debug)]
pub struct CompletedRun {
    pub report: RunReport,
    pub duration_ms: u64,
}

impl JobRunner {
    pub fn new(context: JobContext) -> Self {
        Self {
            jobs: Vec::new(),
            running: Arc::new(Mutex::new(HashSet::new())),
            context,
        }
    }

    pub fn register(&mut self, job: Arc<dyn SyncJob>) {
        info!("Registering job {}: {}", job.id(), job.description());
        self.jobs.push(job);
    }

    pub fn list(&self) -> Vec<JobInfo> {
        let running = self.running.lock().unwrap();
        self.jobs
            .iter()
            .map(|job| {
                let schedule = match job.schedule() {
                    JobSchedule::Interval(interval) => ScheduleInfo {
                        schedule_type: "interval",
                        interval_secs: Some(interval.as_secs()),
                    },
                    JobSchedule::Manual => ScheduleInfo {
                        schedule_type: "manual",
                        interval_secs: None,
                    },
                };
                JobInfo {
                    id: job.id(),
                    name: job.name(),
                    description: job.description(),
                    schedule,
                    is_running: running.contains(job.id()),
                }
            })
            .collect()
    }

    /// Ids and intervals of the jobs that run on a timer.
    pub fn scheduled_jobs(&self) -> Vec<(&'static str, Duration)> {
        self.jobs
            .iter()
            .filter_map(|job| match job.schedule() {
                JobSchedule::Interval(interval) => Some((job.id(), interval)),
                JobSchedule::Manual => None,
            })
            .collect()
    }

    /// Runs a job to completion and returns its report.
    ///
    /// The execution is wrapped in its own task so that the running-flag is
    /// cleared even when the caller (an HTTP request, say) goes away
    /// mid-run.
    pub async fn run_job(&self, job_id: &str) -> Result<CompletedRun, JobError> {
        let job = self
            .jobs
            .iter()
            .find(|job| job.id() == job_id)
            .cloned()
            .ok_or(JobError::NotFound)?;
        let id = job.id();

        {
            let mut running = self.running.lock().unwrap();
            if !running.insert(id.to_string()) {
                return Err(JobError::AlreadyRunning);
            }
        }

        info!("Starting job {}", id);
        let context = self.context.clone();
        let running = Arc::clone(&self.running);

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let result = tokio::task::spawn_blocking(move || job.execute(&context)).await;
            running.lock().unwrap().remove(id);
            (result, started.elapsed())
        });
        let (result, elapsed) = task
            .await
            .map_err(|e| JobError::ExecutionFailed(format!("job task failed: {}", e)))?;

        match result {
            Ok(Ok(report)) => {
                info!(
                    "Job {} completed in {:?} with {} record errors",
                    id,
                    elapsed,
                    report.errors.len()
                );
                Ok(CompletedRun {
                    report,
                    duration_ms: elapsed.as_millis() as u64,
                })
            }
            Ok(Err(err)) => {
                error!("Job {} failed after {:?}: {}", id, elapsed, err);
                Err(err)
            }
            Err(join_err) => {
                error!("Job {} panicked after {:?}: {}", id, elapsed, join_err);
                Err(JobError::ExecutionFailed(format!("task panic: {}", join_err)))
            }
        }
    }
}
