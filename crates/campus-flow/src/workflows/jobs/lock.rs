use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::schedule::JobKind;

/// Keeps a job kind from overlapping with itself. Different kinds may run side by side.
#[derive(Debug, Clone, Default)]
pub struct JobLock {
    running: Arc<Mutex<HashSet<JobKind>>>,
}

/// Held for the duration of a run; dropping it releases the job.
#[derive(Debug)]
pub struct JobGuard {
    kind: JobKind,
    running: Arc<Mutex<HashSet<JobKind>>>,
}

impl JobLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another run of the same job is in flight.
    pub fn try_acquire(&self, kind: JobKind) -> Option<JobGuard> {
        if !lock(&self.running).insert(kind) {
            return None;
        }
        Some(JobGuard {
            kind,
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self, kind: JobKind) -> bool {
        lock(&self.running).contains(&kind)
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        lock(&self.running).remove(&self.kind);
    }
}

// The set stays consistent even if a holder panicked, so a poisoned lock is still usable.
fn lock(running: &Mutex<HashSet<JobKind>>) -> MutexGuard<'_, HashSet<JobKind>> {
    running.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_job_cannot_overlap() {
        let lock = JobLock::new();
        let guard = lock.try_acquire(JobKind::SubscriptionExpiry);
        assert!(guard.is_some());
        assert!(lock.try_acquire(JobKind::SubscriptionExpiry).is_none());
        assert!(lock.try_acquire(JobKind::ClassReminders).is_some());

        drop(guard);
        assert!(!lock.is_running(JobKind::SubscriptionExpiry));
        assert!(lock.try_acquire(JobKind::SubscriptionExpiry).is_some());
    }
}
