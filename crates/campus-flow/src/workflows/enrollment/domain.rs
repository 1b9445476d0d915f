use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::school::academics::{Assignment, Submission};
use crate::workflows::school::domain::{
    CourseId, EnrollmentId, EnrollmentRequestId, Frequency, InvalidTransition, PaymentId,
    Relationship, StudentId, UserId,
};

/// Status of an enrollment request as it moves through parent and payment gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentRequestStatus {
    Pending,
    ParentNotified,
    PaymentPending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentEvent {
    NotifyParent,
    RequestPayment,
    Approve { payment_verified: bool },
    Reject,
    Cancel,
}

impl EnrollmentEvent {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentEvent::NotifyParent => "notify parent for",
            EnrollmentEvent::RequestPayment => "request payment for",
            EnrollmentEvent::Approve { .. } => "approve",
            EnrollmentEvent::Reject => "reject",
            EnrollmentEvent::Cancel => "cancel",
        }
    }
}

impl EnrollmentRequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentRequestStatus::Pending => "pending",
            EnrollmentRequestStatus::ParentNotified => "parent_notified",
            EnrollmentRequestStatus::PaymentPending => "payment_pending",
            EnrollmentRequestStatus::Approved => "approved",
            EnrollmentRequestStatus::Rejected => "rejected",
            EnrollmentRequestStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            EnrollmentRequestStatus::Approved
                | EnrollmentRequestStatus::Rejected
                | EnrollmentRequestStatus::Cancelled
        )
    }

    pub fn apply(self, event: EnrollmentEvent) -> Result<Self, InvalidTransition> {
        use EnrollmentEvent as E;
        use EnrollmentRequestStatus as S;

        match (self, event) {
            (S::Pending, E::NotifyParent) => Ok(S::ParentNotified),
            (S::Pending, E::RequestPayment) => Ok(S::PaymentPending),
            (S::PaymentPending, E::Approve { .. }) => Ok(S::Approved),
            (S::ParentNotified, E::Approve { payment_verified: true }) => Ok(S::Approved),
            (S::Pending | S::ParentNotified | S::PaymentPending, E::Reject) => Ok(S::Rejected),
            (S::Pending | S::ParentNotified | S::PaymentPending, E::Cancel) => Ok(S::Cancelled),
            (from, event) => Err(InvalidTransition {
                from: from.label(),
                event: event.label(),
            }),
        }
    }
}

/// Contact details for a parent the school has no account for yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub id: EnrollmentRequestId,
    pub student: StudentId,
    pub course: CourseId,
    pub frequency: Frequency,
    pub status: EnrollmentRequestStatus,
    pub quoted_price: Decimal,
    pub currency: String,
    pub requested_at: DateTime<Utc>,
    pub processor: Option<UserId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub enrollment: Option<EnrollmentId>,
    pub verified_payment: Option<PaymentId>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
    Failed,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
            EnrollmentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student: StudentId,
    pub course: CourseId,
    pub status: EnrollmentStatus,
    pub progress_percentage: f32,
    pub final_grade: Option<f32>,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: Option<EnrollmentRequestId>,
}

impl Enrollment {
    pub fn start(
        student: StudentId,
        course: CourseId,
        request: Option<EnrollmentRequestId>,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EnrollmentId::generate(),
            student,
            course,
            status: EnrollmentStatus::Active,
            progress_percentage: 0.0,
            final_grade: None,
            enrolled_at,
            completed_at: None,
            request,
        }
    }
}

/// Share of a course's assignments the student has had graded, as a percentage with two
/// decimals. Courses without assignments report zero.
pub fn progress_percentage(
    student: &StudentId,
    assignments: &[Assignment],
    submissions: &[Submission],
) -> f32 {
    if assignments.is_empty() {
        return 0.0;
    }

    let graded = assignments
        .iter()
        .filter(|assignment| {
            submissions.iter().any(|submission| {
                submission.assignment == assignment.id
                    && &submission.student == student
                    && submission.is_graded()
            })
        })
        .count();

    let raw = graded as f32 / assignments.len() as f32 * 100.0;
    ((raw * 100.0).round() / 100.0).clamp(0.0, 100.0)
}
