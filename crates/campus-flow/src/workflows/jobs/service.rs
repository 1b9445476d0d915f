use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::lock::JobLock;
use super::schedule::JobKind;
use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{Enrollment, EnrollmentStatus};
use crate::workflows::payments::{ExpirySweep, PaymentError, PaymentVerificationService};
use crate::workflows::reporting::{ChildProgress, ProgressReporter, ReportingSource};
use crate::workflows::school::domain::{CourseId, UserId};
use crate::workflows::school::notify::{
    dispatch, Notification, NotificationKind, Notifier, Recipient,
};
use crate::workflows::school::repository::RepositoryError;

/// Counters for one notification batch. A failed item never stops the rest of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub processed: usize,
    pub notified: usize,
    pub failed: usize,
}

impl BatchOutcome {
    fn delivered(&mut self, sent: bool) {
        if sent {
            self.notified += 1;
        } else {
            self.failed += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobReport {
    Batch(BatchOutcome),
    Expiry(ExpirySweep),
}

/// The recurring notification and maintenance jobs.
pub struct ScheduledJobs<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    payments: PaymentVerificationService<S, N>,
    reporter: ProgressReporter<S>,
    lock: JobLock,
    reminder_horizon: Duration,
}

impl<S, N> ScheduledJobs<S, N>
where
    S: ReportingSource + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: &WorkflowConfig) -> Self {
        Self {
            payments: PaymentVerificationService::new(store.clone(), notifier.clone(), config),
            reporter: ProgressReporter::new(store.clone(), config),
            store,
            notifier,
            lock: JobLock::new(),
            reminder_horizon: Duration::hours(config.reminder_horizon_hours),
        }
    }

    pub fn lock(&self) -> &JobLock {
        &self.lock
    }

    /// Run one job under the job lock.
    pub fn run(&self, kind: JobKind, now: DateTime<Utc>) -> Result<JobReport, JobError> {
        let _guard = self
            .lock
            .try_acquire(kind)
            .ok_or(JobError::AlreadyRunning(kind))?;
        info!(job = kind.label(), "job started");

        let today = now.date_naive();
        let report = match kind {
            JobKind::ClassReminders => JobReport::Batch(self.send_class_reminders(now)?),
            JobKind::AssignmentDueReminders => {
                JobReport::Batch(self.send_assignment_due_reminders(now)?)
            }
            JobKind::SubscriptionExpiry => JobReport::Expiry(self.check_subscription_expiry(today)?),
            JobKind::PendingGradingReminders => {
                JobReport::Batch(self.send_pending_grading_reminders(now)?)
            }
            JobKind::WeeklyParentReports => {
                JobReport::Batch(self.send_weekly_parent_reports(today)?)
            }
        };

        info!(job = kind.label(), ?report, "job finished");
        Ok(report)
    }

    pub fn check_subscription_expiry(&self, today: NaiveDate) -> Result<ExpirySweep, JobError> {
        Ok(self.payments.check_expiry(today)?)
    }

    /// Remind active enrollees of sessions starting within the reminder horizon.
    pub fn send_class_reminders(&self, now: DateTime<Utc>) -> Result<BatchOutcome, JobError> {
        let mut outcome = BatchOutcome::default();
        let sessions = self
            .store
            .sessions_between(now, now + self.reminder_horizon)?;

        for session in sessions.iter().filter(|session| !session.cancelled) {
            outcome.processed += 1;
            let enrollees = match self.active_enrollees(&session.course) {
                Ok(enrollees) => enrollees,
                Err(error) => {
                    outcome.failed += 1;
                    warn!(session = %session.id, %error, "could not load session enrollees");
                    continue;
                }
            };

            for enrollment in enrollees {
                let sent = dispatch(
                    self.notifier.as_ref(),
                    Notification::new(
                        Recipient::Student(enrollment.student),
                        NotificationKind::ClassReminder,
                    )
                    .with("session_id", &session.id)
                    .with("title", &session.title)
                    .with("starts_at", session.starts_at.to_rfc3339()),
                );
                outcome.delivered(sent);
            }
        }

        Ok(outcome)
    }

    /// Remind active enrollees who have not submitted work due within the horizon.
    pub fn send_assignment_due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<BatchOutcome, JobError> {
        let mut outcome = BatchOutcome::default();
        let assignments = self
            .store
            .assignments_due_between(now, now + self.reminder_horizon)?;

        for assignment in &assignments {
            outcome.processed += 1;
            let enrollees = match self.active_enrollees(&assignment.course) {
                Ok(enrollees) => enrollees,
                Err(error) => {
                    outcome.failed += 1;
                    warn!(assignment = %assignment.id, %error, "could not load assignment enrollees");
                    continue;
                }
            };

            for enrollment in enrollees {
                let submitted = match self.store.submissions_for_student(&enrollment.student) {
                    Ok(submissions) => submissions
                        .iter()
                        .any(|submission| submission.assignment == assignment.id),
                    Err(error) => {
                        outcome.failed += 1;
                        warn!(student = %enrollment.student, %error, "could not load submissions");
                        continue;
                    }
                };
                if submitted {
                    continue;
                }

                let sent = dispatch(
                    self.notifier.as_ref(),
                    Notification::new(
                        Recipient::Student(enrollment.student),
                        NotificationKind::AssignmentDue,
                    )
                    .with("assignment_id", &assignment.id)
                    .with("title", &assignment.title)
                    .with("due_at", assignment.due_at.to_rfc3339()),
                );
                outcome.delivered(sent);
            }
        }

        Ok(outcome)
    }

    /// One report per opted-in parent with at least one linked child.
    pub fn send_weekly_parent_reports(&self, today: NaiveDate) -> Result<BatchOutcome, JobError> {
        let mut outcome = BatchOutcome::default();

        for parent in self.store.parents()? {
            if !parent.preferences.weekly_reports {
                continue;
            }
            let children = match self.reporter.get_children_progress(&parent.id) {
                Ok(children) => children,
                Err(error) => {
                    outcome.failed += 1;
                    warn!(parent = %parent.id, %error, "could not build weekly report");
                    continue;
                }
            };
            if children.is_empty() {
                continue;
            }
            outcome.processed += 1;

            let mut report = Notification::new(
                Recipient::Parent(parent.id.clone()),
                NotificationKind::WeeklyParentReport,
            )
            .with("week_ending", today)
            .with("children", children.len());
            for child in &children {
                report = report.with(&format!("child.{}", child.student), child_line(child));
            }
            outcome.delivered(dispatch(self.notifier.as_ref(), report));
        }

        Ok(outcome)
    }

    /// One reminder per instructor summarising ungraded submissions across their courses.
    pub fn send_pending_grading_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<BatchOutcome, JobError> {
        let mut outcome = BatchOutcome::default();
        let mut per_instructor: BTreeMap<UserId, (usize, BTreeSet<String>)> = BTreeMap::new();

        for submission in self.store.ungraded_submissions()? {
            let course = match self.store.assignment(&submission.assignment) {
                Ok(Some(assignment)) => self.store.course(&assignment.course),
                Ok(None) => Ok(None),
                Err(error) => Err(error),
            };
            match course {
                Ok(Some(course)) => {
                    let entry = per_instructor.entry(course.instructor).or_default();
                    entry.0 += 1;
                    entry.1.insert(course.title);
                }
                Ok(None) => {
                    outcome.failed += 1;
                    warn!(assignment = %submission.assignment, "ungraded submission has no course");
                }
                Err(error) => {
                    outcome.failed += 1;
                    warn!(assignment = %submission.assignment, %error, "could not resolve course");
                }
            }
        }

        for (instructor, (count, courses)) in per_instructor {
            outcome.processed += 1;
            let sent = dispatch(
                self.notifier.as_ref(),
                Notification::new(Recipient::User(instructor), NotificationKind::PendingGrading)
                    .with("pending_count", count)
                    .with("courses", courses.into_iter().collect::<Vec<_>>().join(", "))
                    .with("as_of", now.to_rfc3339()),
            );
            outcome.delivered(sent);
        }

        Ok(outcome)
    }

    fn active_enrollees(&self, course: &CourseId) -> Result<Vec<Enrollment>, RepositoryError> {
        Ok(self
            .store
            .enrollments_for_course(course)?
            .into_iter()
            .filter(|enrollment| enrollment.status == EnrollmentStatus::Active)
            .collect())
    }
}

fn child_line(child: &ChildProgress) -> String {
    let mut line = format!("{}: {:.2}% overall progress", child.name, child.overall_progress);
    if let Some(rate) = child.attendance_rate {
        line.push_str(&format!(", {rate:.1}% attendance"));
    }
    line
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {0} is already running")]
    AlreadyRunning(JobKind),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
