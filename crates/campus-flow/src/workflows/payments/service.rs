use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    Payer, Payment, PaymentDecision, PaymentStatus, PaymentSubmission, Subscription,
    SubscriptionStatus,
};
use super::repository::PaymentRepository;
use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{EnrollmentRepository, EnrollmentService};
use crate::workflows::school::domain::{
    CourseId, InvalidTransition, ParentId, PaymentId, StudentId, UserId,
};
use crate::workflows::school::notify::{
    dispatch, Notification, NotificationKind, Notifier, Recipient,
};
use crate::workflows::school::repository::RepositoryError;

/// Result of one subscription expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpirySweep {
    pub expired: usize,
    pub warned: usize,
    pub failed: usize,
}

/// Payment receipts, their admin review, and the subscriptions they keep alive.
pub struct PaymentVerificationService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    enrollments: EnrollmentService<S, N>,
    expiry_warning_days: i64,
    default_currency: String,
}

impl<S, N> PaymentVerificationService<S, N>
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: &WorkflowConfig) -> Self {
        Self {
            enrollments: EnrollmentService::new(store.clone(), notifier.clone(), config),
            store,
            notifier,
            expiry_warning_days: config.expiry_warning_days,
            default_currency: config.default_currency.clone(),
        }
    }

    pub fn submit_payment(
        &self,
        submission: PaymentSubmission,
        now: DateTime<Utc>,
    ) -> Result<Payment, PaymentError> {
        if submission.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(submission.amount));
        }
        let receipt_ref = submission.receipt_ref.trim().to_string();
        if receipt_ref.is_empty() {
            return Err(PaymentError::MissingReceipt);
        }

        if self.store.student(&submission.student)?.is_none() {
            return Err(PaymentError::UnknownStudent(submission.student));
        }
        let course = self
            .store
            .course(&submission.course)?
            .ok_or_else(|| PaymentError::UnknownCourse(submission.course.clone()))?;
        self.check_payer(&submission.payer, &submission.student)?;

        let currency = submission
            .currency
            .filter(|currency| !currency.trim().is_empty())
            .or_else(|| Some(course.currency.clone()).filter(|currency| !currency.is_empty()))
            .unwrap_or_else(|| self.default_currency.clone());

        let payment = Payment {
            id: PaymentId::generate(),
            payer: submission.payer,
            student: submission.student,
            course: course.id,
            amount: submission.amount,
            currency,
            payment_date: submission.payment_date,
            method: submission.method,
            receipt_ref,
            status: PaymentStatus::Pending,
            verifier: None,
            reviewed_at: None,
            admin_notes: None,
            payer_notes: submission.payer_notes,
            submitted_at: now,
        };
        let stored = self.store.insert_payment(payment)?;

        info!(
            payment = %stored.id,
            student = %stored.student,
            amount = %stored.amount,
            method = stored.method.label(),
            "payment submitted for review"
        );
        dispatch(
            self.notifier.as_ref(),
            Notification::new(Recipient::AdminReviewers, NotificationKind::PaymentSubmitted)
                .with("payment_id", &stored.id)
                .with("student_id", &stored.student)
                .with("amount", stored.amount)
                .with("currency", &stored.currency),
        );

        Ok(stored)
    }

    /// Accept a pending payment, activating or extending the subscription for the pair and
    /// unblocking open enrollment requests.
    pub fn verify(
        &self,
        payment_id: &PaymentId,
        verifier: &UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Payment, PaymentError> {
        let payment = self.fetch(payment_id)?;
        let verified = Payment {
            status: payment.status.apply(PaymentDecision::Verify)?,
            verifier: Some(verifier.clone()),
            reviewed_at: Some(now),
            admin_notes: notes,
            ..payment
        };

        let course = self
            .store
            .course(&verified.course)?
            .ok_or_else(|| PaymentError::UnknownCourse(verified.course.clone()))?;
        let Some(subscription) = self
            .store
            .record_payment_verification(&verified, course.subscription_duration_weeks)?
        else {
            return Err(PaymentError::InvalidState(InvalidTransition {
                from: "processed",
                event: PaymentDecision::Verify.label(),
            }));
        };
        info!(
            payment = %verified.id,
            verifier = %verifier,
            subscription = %subscription.id,
            end_date = %subscription.end_date,
            "payment verified"
        );

        match self.enrollments.record_verified_payment(
            &verified.student,
            &verified.course,
            &verified.id,
        ) {
            Ok(0) => {}
            Ok(advanced) => info!(payment = %verified.id, advanced, "enrollment requests unblocked"),
            Err(error) => warn!(payment = %verified.id, %error, "failed to advance enrollment requests"),
        }

        dispatch(
            self.notifier.as_ref(),
            Notification::new(verified.payer.recipient(), NotificationKind::PaymentVerified)
                .with("payment_id", &verified.id)
                .with("course_title", &course.title)
                .with("subscription_end", subscription.end_date),
        );

        Ok(verified)
    }

    pub fn reject(
        &self,
        payment_id: &PaymentId,
        verifier: &UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, PaymentError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PaymentError::ReasonRequired);
        }

        let payment = self.fetch(payment_id)?;
        let rejected = Payment {
            status: payment.status.apply(PaymentDecision::Reject)?,
            verifier: Some(verifier.clone()),
            reviewed_at: Some(now),
            admin_notes: Some(reason.to_string()),
            ..payment
        };
        if !self
            .store
            .record_payment_review(&rejected, PaymentStatus::Pending)?
        {
            return Err(PaymentError::InvalidState(InvalidTransition {
                from: "processed",
                event: PaymentDecision::Reject.label(),
            }));
        }

        info!(payment = %rejected.id, verifier = %verifier, "payment rejected");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(rejected.payer.recipient(), NotificationKind::PaymentRejected)
                .with("payment_id", &rejected.id)
                .with("reason", reason),
        );

        Ok(rejected)
    }

    /// Expire lapsed subscriptions and warn holders whose term ends soon. Running the sweep
    /// twice on the same day changes nothing the second time.
    pub fn check_expiry(&self, today: NaiveDate) -> Result<ExpirySweep, PaymentError> {
        let mut sweep = ExpirySweep::default();

        for subscription in self
            .store
            .subscriptions_with_status(SubscriptionStatus::Active)?
        {
            if subscription.is_lapsed(today) {
                let expired = Subscription {
                    status: SubscriptionStatus::Expired,
                    ..subscription
                };
                match self
                    .store
                    .update_subscription(&expired, SubscriptionStatus::Active)
                {
                    Ok(true) => {
                        sweep.expired += 1;
                        dispatch(
                            self.notifier.as_ref(),
                            Notification::new(
                                Recipient::Student(expired.student.clone()),
                                NotificationKind::SubscriptionExpired,
                            )
                            .with("subscription_id", &expired.id)
                            .with("course_id", &expired.course)
                            .with("end_date", expired.end_date),
                        );
                    }
                    Ok(false) => {}
                    Err(error) => {
                        sweep.failed += 1;
                        warn!(subscription = %expired.id, %error, "failed to expire subscription");
                    }
                }
            } else if subscription.needs_warning(today, self.expiry_warning_days) {
                let days_remaining = subscription.days_remaining(today);
                let warned = Subscription {
                    last_warned_on: Some(today),
                    ..subscription
                };
                match self
                    .store
                    .update_subscription(&warned, SubscriptionStatus::Active)
                {
                    Ok(true) => {
                        sweep.warned += 1;
                        dispatch(
                            self.notifier.as_ref(),
                            Notification::new(
                                Recipient::Student(warned.student.clone()),
                                NotificationKind::SubscriptionExpiring,
                            )
                            .with("subscription_id", &warned.id)
                            .with("course_id", &warned.course)
                            .with("end_date", warned.end_date)
                            .with("days_remaining", days_remaining),
                        );
                    }
                    Ok(false) => {}
                    Err(error) => {
                        sweep.failed += 1;
                        warn!(subscription = %warned.id, %error, "failed to record expiry warning");
                    }
                }
            }
        }

        info!(
            expired = sweep.expired,
            warned = sweep.warned,
            failed = sweep.failed,
            %today,
            "subscription expiry sweep finished"
        );
        Ok(sweep)
    }

    pub fn get(&self, payment_id: &PaymentId) -> Result<Payment, PaymentError> {
        self.fetch(payment_id)
    }

    pub fn pending(&self) -> Result<Vec<Payment>, PaymentError> {
        Ok(self.store.pending_payments()?)
    }

    pub fn subscriptions(&self, student: &StudentId) -> Result<Vec<Subscription>, PaymentError> {
        Ok(self.store.subscriptions_for_student(student)?)
    }

    fn check_payer(&self, payer: &Payer, beneficiary: &StudentId) -> Result<(), PaymentError> {
        match payer {
            Payer::Student(student) if student == beneficiary => Ok(()),
            Payer::Student(_) => Err(PaymentError::PayerMismatch),
            Payer::Parent(parent) => {
                if self.store.parent(parent)?.is_none() {
                    return Err(PaymentError::UnknownParent(parent.clone()));
                }
                match self.store.parent_link(parent, beneficiary)? {
                    Some(_) => Ok(()),
                    None => Err(PaymentError::PayerMismatch),
                }
            }
        }
    }

    fn fetch(&self, id: &PaymentId) -> Result<Payment, PaymentError> {
        self.store
            .fetch_payment(id)?
            .ok_or(PaymentError::Repository(RepositoryError::NotFound))
    }
}

/// Error raised by the payment verification workflow.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("student {0} not found")]
    UnknownStudent(StudentId),
    #[error("parent {0} not found")]
    UnknownParent(ParentId),
    #[error("course {0} not found")]
    UnknownCourse(CourseId),
    #[error("payer is not allowed to pay for this student")]
    PayerMismatch,
    #[error("payment amount {0} must be positive")]
    InvalidAmount(Decimal),
    #[error("a receipt reference is required")]
    MissingReceipt,
    #[error("a rejection reason is required")]
    ReasonRequired,
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
