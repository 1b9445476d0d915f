use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Enrollment, EnrollmentRequest, EnrollmentRequestStatus, EnrollmentStatus};
use crate::workflows::school::domain::{
    CourseId, EnrollmentId, EnrollmentRequestId, ParentAccount, Relationship, StudentId,
};
use crate::workflows::school::repository::{
    AcademicRecords, AccountDirectory, NewParentAccount, RepositoryError, SchoolDirectory,
};

/// Parent to attach to a minor's first request. The account is matched by email or
/// provisioned, then linked with full view permissions.
#[derive(Debug, Clone)]
pub struct GuardianLink {
    pub account: NewParentAccount,
    pub relationship: Relationship,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardianOutcome {
    Matched(ParentAccount),
    Provisioned(ParentAccount),
}

/// Storage for enrollment requests and enrollments. Status writes are compare-and-set: they
/// only land when the stored status still equals `expected`.
pub trait EnrollmentRepository: SchoolDirectory + AccountDirectory + AcademicRecords {
    fn insert_enrollment_request(
        &self,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentRequest, RepositoryError>;
    /// Inserts the request together with its guardian account and link. Nothing is written
    /// when an open request already exists for the pair (`Conflict`).
    fn insert_request_with_guardian(
        &self,
        request: EnrollmentRequest,
        guardian: GuardianLink,
    ) -> Result<(EnrollmentRequest, GuardianOutcome), RepositoryError>;
    fn fetch_enrollment_request(
        &self,
        id: &EnrollmentRequestId,
    ) -> Result<Option<EnrollmentRequest>, RepositoryError>;
    /// Non-terminal requests for the pair.
    fn open_enrollment_requests(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<Vec<EnrollmentRequest>, RepositoryError>;
    fn enrollment_requests_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<EnrollmentRequest>, RepositoryError>;
    fn update_enrollment_request(
        &self,
        updated: &EnrollmentRequest,
        expected: EnrollmentRequestStatus,
    ) -> Result<bool, RepositoryError>;
    /// Stores the approved request and its new enrollment in one write. Returns `false` when
    /// the request moved on or already produced an enrollment.
    fn record_enrollment_approval(
        &self,
        approved: &EnrollmentRequest,
        expected: EnrollmentRequestStatus,
        enrollment: Enrollment,
    ) -> Result<bool, RepositoryError>;

    fn insert_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError>;
    fn fetch_enrollment(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError>;
    fn enrollments_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Enrollment>, RepositoryError>;
    fn enrollments_for_course(&self, course: &CourseId)
        -> Result<Vec<Enrollment>, RepositoryError>;
    fn update_enrollment(
        &self,
        updated: &Enrollment,
        expected: EnrollmentStatus,
    ) -> Result<bool, RepositoryError>;
}

/// Sanitized representation of an enrollment request's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentRequestView {
    pub request_id: EnrollmentRequestId,
    pub student: StudentId,
    pub course: CourseId,
    pub frequency: &'static str,
    pub status: &'static str,
    pub quoted_price: Decimal,
    pub currency: String,
    pub payment_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentId>,
}

impl From<&EnrollmentRequest> for EnrollmentRequestView {
    fn from(request: &EnrollmentRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            student: request.student.clone(),
            course: request.course.clone(),
            frequency: request.frequency.label(),
            status: request.status.label(),
            quoted_price: request.quoted_price,
            currency: request.currency.clone(),
            payment_verified: request.verified_payment.is_some(),
            enrollment: request.enrollment.clone(),
        }
    }
}
