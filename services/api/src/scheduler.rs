use std::sync::Arc;

use campus_flow::workflows::jobs::{JobError, JobKind, ScheduledJobs};
use campus_flow::workflows::school::{InMemorySchoolStore, Notifier};
use chrono::Utc;
use tracing::{error, info, warn};

/// Spawn one timer task per job kind. Each task sleeps until the job's next fire time and
/// runs it on the blocking pool; a failed run is logged and the timer keeps going.
pub(crate) fn spawn_job_timers<N>(jobs: Arc<ScheduledJobs<InMemorySchoolStore, N>>)
where
    N: Notifier + 'static,
{
    for kind in JobKind::ALL {
        let jobs = jobs.clone();
        info!(job = kind.label(), schedule = %kind.schedule(), "job timer started");

        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = kind.next_run_after(now);
                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let runner = jobs.clone();
                let outcome =
                    tokio::task::spawn_blocking(move || runner.run(kind, Utc::now())).await;
                match outcome {
                    Ok(Ok(report)) => info!(job = kind.label(), ?report, "scheduled job completed"),
                    Ok(Err(JobError::AlreadyRunning(_))) => {
                        warn!(job = kind.label(), "previous run still in progress; skipped")
                    }
                    Ok(Err(err)) => error!(job = kind.label(), error = %err, "scheduled job failed"),
                    Err(err) => error!(job = kind.label(), error = %err, "scheduled job panicked"),
                }
            }
        });
    }
}
