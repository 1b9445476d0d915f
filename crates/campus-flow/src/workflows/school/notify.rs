use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{ParentId, StudentId, UserId};

/// Who a notification is addressed to. Resolving a recipient to an address (e-mail, SMS) is
/// the dispatcher's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Student(StudentId),
    Parent(ParentId),
    User(UserId),
    AdminReviewers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LinkRequested,
    LinkApproved,
    LinkRejected,
    ParentAccountCreated,
    EnrollmentParentNotice,
    EnrollmentPaymentRequired,
    EnrollmentApproved,
    EnrollmentRejected,
    EnrollmentCompleted,
    PromotionApproved,
    PromotionRejected,
    PaymentSubmitted,
    PaymentVerified,
    PaymentRejected,
    SubscriptionExpiring,
    SubscriptionExpired,
    ClassReminder,
    AssignmentDue,
    WeeklyParentReport,
    PendingGrading,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::LinkRequested => "link_requested",
            NotificationKind::LinkApproved => "link_approved",
            NotificationKind::LinkRejected => "link_rejected",
            NotificationKind::ParentAccountCreated => "parent_account_created",
            NotificationKind::EnrollmentParentNotice => "enrollment_parent_notice",
            NotificationKind::EnrollmentPaymentRequired => "enrollment_payment_required",
            NotificationKind::EnrollmentApproved => "enrollment_approved",
            NotificationKind::EnrollmentRejected => "enrollment_rejected",
            NotificationKind::EnrollmentCompleted => "enrollment_completed",
            NotificationKind::PromotionApproved => "promotion_approved",
            NotificationKind::PromotionRejected => "promotion_rejected",
            NotificationKind::PaymentSubmitted => "payment_submitted",
            NotificationKind::PaymentVerified => "payment_verified",
            NotificationKind::PaymentRejected => "payment_rejected",
            NotificationKind::SubscriptionExpiring => "subscription_expiring",
            NotificationKind::SubscriptionExpired => "subscription_expired",
            NotificationKind::ClassReminder => "class_reminder",
            NotificationKind::AssignmentDue => "assignment_due",
            NotificationKind::WeeklyParentReport => "weekly_parent_report",
            NotificationKind::PendingGrading => "pending_grading",
        }
    }
}

/// Payload handed to the dispatcher; `details` feed the mail template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub details: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(recipient: Recipient, kind: NotificationKind) -> Self {
        Self {
            recipient,
            kind,
            details: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

/// Outbound notification hook (mailer, SMS gateway, in-app inbox).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sends a notification without letting a delivery failure escape into the workflow.
/// Returns whether the dispatcher accepted it.
pub(crate) fn dispatch<N>(notifier: &N, notification: Notification) -> bool
where
    N: Notifier + ?Sized,
{
    let kind = notification.kind.label();
    match notifier.notify(notification) {
        Ok(()) => {
            debug!(kind, "notification dispatched");
            true
        }
        Err(error) => {
            warn!(kind, %error, "notification dispatch failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Notifier for Offline {
        fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("smtp down".to_string()))
        }
    }

    #[test]
    fn dispatch_swallows_transport_errors() {
        let delivered = dispatch(
            &Offline,
            Notification::new(Recipient::AdminReviewers, NotificationKind::PaymentSubmitted),
        );
        assert!(!delivered);
    }

    #[test]
    fn details_are_collected_in_order() {
        let notification =
            Notification::new(Recipient::AdminReviewers, NotificationKind::LinkRequested)
                .with("student", "stu-1")
                .with("parent", "par-1");
        let keys: Vec<_> = notification.details.keys().cloned().collect();
        assert_eq!(keys, vec!["parent".to_string(), "student".to_string()]);
    }
}
