//! Scheduled reminders, reports and the subscription expiry sweep.

pub mod lock;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use lock::{JobGuard, JobLock};
pub use schedule::{JobKind, JobSchedule, UnknownJob};
pub use service::{BatchOutcome, JobError, JobReport, ScheduledJobs};
