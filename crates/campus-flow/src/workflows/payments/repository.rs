use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Payment, PaymentStatus, Payer, Subscription, SubscriptionStatus};
use crate::workflows::school::domain::{CourseId, ParentId, PaymentId, StudentId, SubscriptionId};
use crate::workflows::school::repository::{RepositoryError, SchoolDirectory};

/// Storage for payments and the subscriptions they pay for.
pub trait PaymentRepository: SchoolDirectory {
    fn insert_payment(&self, payment: Payment) -> Result<Payment, RepositoryError>;
    fn fetch_payment(&self, id: &PaymentId) -> Result<Option<Payment>, RepositoryError>;
    fn pending_payments(&self) -> Result<Vec<Payment>, RepositoryError>;
    /// Payments the parent made or that benefit one of the given students.
    fn payments_for_parent(
        &self,
        parent: &ParentId,
        children: &[StudentId],
    ) -> Result<Vec<Payment>, RepositoryError>;
    fn payments_for_student(&self, student: &StudentId) -> Result<Vec<Payment>, RepositoryError>;
    fn subscription_for(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<Option<Subscription>, RepositoryError>;
    fn subscriptions_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Subscription>, RepositoryError>;
    fn subscriptions_with_status(
        &self,
        status: SubscriptionStatus,
    ) -> Result<Vec<Subscription>, RepositoryError>;
    /// Writes a rejected payment when it still has `expected` status.
    fn record_payment_review(
        &self,
        reviewed: &Payment,
        expected: PaymentStatus,
    ) -> Result<bool, RepositoryError>;
    /// Writes a verified payment when it is still pending and, in the same step, opens or
    /// extends the subscription for its student and course. `None` when the payment was
    /// already reviewed.
    fn record_payment_verification(
        &self,
        verified: &Payment,
        weeks: u32,
    ) -> Result<Option<Subscription>, RepositoryError>;
    fn update_subscription(
        &self,
        updated: &Subscription,
        expected: SubscriptionStatus,
    ) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub payment_id: PaymentId,
    pub payer: Payer,
    pub student: StudentId,
    pub course: CourseId,
    pub amount: Decimal,
    pub currency: String,
    pub payment_date: NaiveDate,
    pub method: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl From<&Payment> for PaymentView {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id.clone(),
            payer: payment.payer.clone(),
            student: payment.student.clone(),
            course: payment.course.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            payment_date: payment.payment_date,
            method: payment.method.label(),
            status: payment.status.label(),
            admin_notes: payment.admin_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub subscription_id: SubscriptionId,
    pub student: StudentId,
    pub course: CourseId,
    pub status: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&Subscription> for SubscriptionView {
    fn from(subscription: &Subscription) -> Self {
        Self {
            subscription_id: subscription.id.clone(),
            student: subscription.student.clone(),
            course: subscription.course.clone(),
            status: subscription.status.label(),
            start_date: subscription.start_date,
            end_date: subscription.end_date,
        }
    }
}
