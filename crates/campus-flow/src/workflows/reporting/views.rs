use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::enrollment::EnrollmentRequestView;
use crate::workflows::linking::LinkRequestView;
use crate::workflows::payments::{PaymentView, SubscriptionView};
use crate::workflows::school::domain::{CourseId, EnrollmentId, ParentId, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentSummary {
    pub enrollment_id: EnrollmentId,
    pub course: CourseId,
    pub course_title: String,
    pub status: &'static str,
    pub progress_percentage: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_grade: Option<f32>,
}

/// One linked child as the parent may see it. Grade and attendance figures are omitted when
/// the link does not grant them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildProgress {
    pub student: StudentId,
    pub name: String,
    pub relationship: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<String>,
    pub overall_progress: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollments: Option<Vec<EnrollmentSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_rate: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParentDashboard {
    pub parent: ParentId,
    pub generated_on: NaiveDate,
    pub children: Vec<ChildProgress>,
    pub pending_link_requests: Vec<LinkRequestView>,
    pub open_enrollment_requests: Vec<EnrollmentRequestView>,
    pub pending_payments: Vec<PaymentView>,
    pub expiring_subscriptions: Vec<SubscriptionView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentProgress {
    pub overall_progress: f32,
    pub attendance_rate: f32,
}
