use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::job::JobError;
use super::runner::JobRunner;

/// Drives the interval-scheduled jobs until shutdown.
///
/// Each job's first run happens one full interval after startup, so a
/// crash-looping server does not hammer the upstream services. Due jobs are
/// run one after another; a job still busy from a manual trigger is simply
/// skipped until its next slot.
pub async fn run_scheduler(runner: Arc<JobRunner>, shutdown: CancellationToken) {
    let scheduled = runner.scheduled_jobs();
    if scheduled.is_empty() {
        info!("No jobs carry an interval schedule");
        shutdown.cancelled().await;
        return;
    }

    let mut slots: Vec<(&'static str, Duration, Instant)> = scheduled
        .into_iter()
        .map(|(id, interval)| {
            info!("Scheduling job {} every {:?}", id, interval);
            (id, interval, Instant::now() + interval)
        })
        .collect();

    loop {
        // Non-empty by construction.
        let next_due = slots.iter().map(|(_, _, at)| *at).min().unwrap();

        tokio::select! {
            _ = tokio::time::sleep_until(next_due) => {}
            _ = shutdown.cancelled() => {
                info!("Scheduler received shutdown signal");
                break;
            }
        }

        let now = Instant::now();
        for slot in slots.iter_mut() {
            let (job_id, interval, due_at) = *slot;
            if due_at > now {
                continue;
            }
            slot.2 = now + interval;

            match runner.run_job(job_id).await {
                Ok(run) => {
                    debug!(
                        "Scheduled run of {} finished in {}ms",
                        job_id, run.duration_ms
                    );
                }
                Err(JobError::AlreadyRunning) => {
                    debug!("Skipping scheduled run of {}, already running", job_id);
                }
                Err(err) => {
                    warn!("Scheduled run of {} failed: {}", job_id, err);
                }
            }
        }
    }

    info!("Scheduler stopped");
}
