use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{
    progress_percentage, Enrollment, EnrollmentEvent, EnrollmentRequest,
    EnrollmentRequestStatus, EnrollmentStatus, ParentInfo,
};
use super::repository::{EnrollmentRepository, GuardianLink, GuardianOutcome};
use crate::config::WorkflowConfig;
use crate::workflows::school::domain::{
    ContactPreferences, Course, CourseId, EnrollmentId, EnrollmentRequestId, Frequency,
    InvalidTransition, ParentAccount, PaymentId, Student, StudentId, UserId,
};
use crate::workflows::school::notify::{
    dispatch, Notification, NotificationKind, Notifier, Recipient,
};
use crate::workflows::school::repository::{NewParentAccount, RepositoryError};

const TEMPORARY_CREDENTIAL_LEN: usize = 12;

/// Course enrollment: minor/adult branching, parent gating, payment gating, and the
/// enrollment lifecycle once a request is approved.
pub struct EnrollmentService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    age_of_majority: u32,
}

/// Parent-side work a new request needs before it can be stored.
enum ParentContacts {
    NotNeeded,
    Linked(Vec<ParentAccount>),
    Guardian(GuardianLink),
}

/// Who the workflow contacted about a new request.
enum Outreach {
    ExistingParents(Vec<ParentAccount>),
    ProvisionedParent {
        account: ParentAccount,
        credential: String,
    },
    MatchedParent(ParentAccount),
    Student,
}

impl<S, N> EnrollmentService<S, N>
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: &WorkflowConfig) -> Self {
        Self {
            store,
            notifier,
            age_of_majority: config.age_of_majority,
        }
    }

    /// Open an enrollment request. Minors are routed to a parent (provisioning one from
    /// `parent_info` when none is linked); adults go straight to payment.
    pub fn submit_request(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
        frequency: Frequency,
        parent_info: Option<ParentInfo>,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentRequest, EnrollmentError> {
        let student = self.student(student_id)?;
        let course = self.course(course_id)?;
        if !course.is_active {
            return Err(EnrollmentError::CourseInactive(course.id));
        }
        let quoted_price = course
            .price_for(frequency)
            .ok_or(EnrollmentError::UnsupportedFrequency(frequency.label()))?;
        if !self
            .store
            .open_enrollment_requests(student_id, course_id)?
            .is_empty()
        {
            return Err(EnrollmentError::DuplicateOpenRequest);
        }

        let minor = student.is_minor(now.date_naive(), self.age_of_majority);
        let (event, contacts) = if minor {
            (EnrollmentEvent::NotifyParent, self.parent_contacts(&student, parent_info, now)?)
        } else {
            (EnrollmentEvent::RequestPayment, ParentContacts::NotNeeded)
        };
        let status = EnrollmentRequestStatus::Pending.apply(event)?;

        let request = EnrollmentRequest {
            id: EnrollmentRequestId::generate(),
            student: student.id.clone(),
            course: course.id.clone(),
            frequency,
            status,
            quoted_price,
            currency: course.currency.clone(),
            requested_at: now,
            processor: None,
            processed_at: None,
            enrollment: None,
            verified_payment: None,
            rejection_reason: None,
        };
        let (stored, outreach) = match contacts {
            ParentContacts::NotNeeded => (self.insert_request(request)?, Outreach::Student),
            ParentContacts::Linked(parents) => (
                self.insert_request(request)?,
                Outreach::ExistingParents(parents),
            ),
            ParentContacts::Guardian(guardian) => {
                let credential = guardian.account.temporary_credential.clone();
                let (stored, outcome) = self
                    .store
                    .insert_request_with_guardian(request, guardian)
                    .map_err(duplicate_on_conflict)?;
                let outreach = match outcome {
                    GuardianOutcome::Matched(parent) => {
                        info!(parent = %parent.id, student = %student.id, "linked existing parent account by email");
                        Outreach::MatchedParent(parent)
                    }
                    GuardianOutcome::Provisioned(account) => {
                        info!(parent = %account.id, student = %student.id, "provisioned parent account for minor enrollment");
                        Outreach::ProvisionedParent {
                            account,
                            credential,
                        }
                    }
                };
                (stored, outreach)
            }
        };

        info!(
            request = %stored.id,
            student = %stored.student,
            course = %stored.course,
            status = stored.status.label(),
            minor,
            "enrollment request submitted"
        );
        self.announce(&stored, &student, &course, outreach);

        Ok(stored)
    }

    /// Create the enrollment for a request that has cleared its gates.
    pub fn approve(
        &self,
        request_id: &EnrollmentRequestId,
        processor: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Enrollment, EnrollmentError> {
        let request = self.fetch_request(request_id)?;
        let previous = request.status;
        let status = previous.apply(EnrollmentEvent::Approve {
            payment_verified: request.verified_payment.is_some(),
        })?;

        let enrollment = Enrollment::start(
            request.student.clone(),
            request.course.clone(),
            Some(request.id.clone()),
            now,
        );
        let approved = EnrollmentRequest {
            status,
            processor: Some(processor.clone()),
            processed_at: Some(now),
            enrollment: Some(enrollment.id.clone()),
            ..request
        };

        if !self
            .store
            .record_enrollment_approval(&approved, previous, enrollment.clone())?
        {
            return Err(EnrollmentError::InvalidState(InvalidTransition {
                from: "processed",
                event: "approve",
            }));
        }

        info!(request = %approved.id, enrollment = %enrollment.id, processor = %processor, "enrollment approved");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Student(approved.student.clone()),
                NotificationKind::EnrollmentApproved,
            )
            .with("request_id", &approved.id)
            .with("enrollment_id", &enrollment.id)
            .with("course_id", &approved.course),
        );

        Ok(enrollment)
    }

    pub fn reject(
        &self,
        request_id: &EnrollmentRequestId,
        processor: &UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentRequest, EnrollmentError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EnrollmentError::ReasonRequired);
        }

        let request = self.fetch_request(request_id)?;
        let previous = request.status;
        let rejected = EnrollmentRequest {
            status: previous.apply(EnrollmentEvent::Reject)?,
            processor: Some(processor.clone()),
            processed_at: Some(now),
            rejection_reason: Some(reason.to_string()),
            ..request
        };
        self.write_request(&rejected, previous, EnrollmentEvent::Reject)?;

        info!(request = %rejected.id, processor = %processor, "enrollment request rejected");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Student(rejected.student.clone()),
                NotificationKind::EnrollmentRejected,
            )
            .with("request_id", &rejected.id)
            .with("reason", reason),
        );

        Ok(rejected)
    }

    pub fn cancel(
        &self,
        request_id: &EnrollmentRequestId,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentRequest, EnrollmentError> {
        let request = self.fetch_request(request_id)?;
        let previous = request.status;
        let cancelled = EnrollmentRequest {
            status: previous.apply(EnrollmentEvent::Cancel)?,
            processed_at: Some(now),
            ..request
        };
        self.write_request(&cancelled, previous, EnrollmentEvent::Cancel)?;

        info!(request = %cancelled.id, from = previous.label(), "enrollment request cancelled");
        Ok(cancelled)
    }

    /// Mark open requests for the pair as paid so they become approvable. Returns how many
    /// requests were updated.
    pub fn record_verified_payment(
        &self,
        student: &StudentId,
        course: &CourseId,
        payment: &PaymentId,
    ) -> Result<usize, EnrollmentError> {
        let mut advanced = 0;
        for request in self.store.open_enrollment_requests(student, course)? {
            let awaiting_payment = matches!(
                request.status,
                EnrollmentRequestStatus::ParentNotified | EnrollmentRequestStatus::PaymentPending
            );
            if !awaiting_payment || request.verified_payment.is_some() {
                continue;
            }

            let expected = request.status;
            let paid = EnrollmentRequest {
                verified_payment: Some(payment.clone()),
                ..request
            };
            if self.store.update_enrollment_request(&paid, expected)? {
                info!(request = %paid.id, payment = %payment, "enrollment request marked paid");
                advanced += 1;
            }
        }
        Ok(advanced)
    }

    /// Admin shortcut that enrolls a student without a request.
    pub fn enroll_directly(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
        processor: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Enrollment, EnrollmentError> {
        let student = self.student(student_id)?;
        let course = self.course(course_id)?;

        let already_active = self
            .store
            .enrollments_for_student(&student.id)?
            .iter()
            .any(|enrollment| {
                enrollment.course == course.id && enrollment.status == EnrollmentStatus::Active
            });
        if already_active {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let enrollment = self
            .store
            .insert_enrollment(Enrollment::start(student.id, course.id, None, now))?;
        info!(enrollment = %enrollment.id, processor = %processor, "direct enrollment created");
        Ok(enrollment)
    }

    /// Recompute progress from graded coursework. Only active enrollments move; completed
    /// ones keep their final figures.
    pub fn update_progress(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<Enrollment, EnrollmentError> {
        let enrollment = self.fetch_enrollment(enrollment_id)?;
        if enrollment.status != EnrollmentStatus::Active {
            return Ok(enrollment);
        }

        let assignments = self.store.assignments_for_course(&enrollment.course)?;
        let submissions = self.store.submissions_for_student(&enrollment.student)?;
        let progress = progress_percentage(&enrollment.student, &assignments, &submissions);

        if (progress - enrollment.progress_percentage).abs() < f32::EPSILON {
            return Ok(enrollment);
        }

        let updated = Enrollment {
            progress_percentage: progress,
            ..enrollment
        };
        if !self
            .store
            .update_enrollment(&updated, EnrollmentStatus::Active)?
        {
            // Completed or dropped concurrently; report what is stored now.
            return self.fetch_enrollment(enrollment_id);
        }
        Ok(updated)
    }

    pub fn complete(
        &self,
        enrollment_id: &EnrollmentId,
        final_grade: f32,
        now: DateTime<Utc>,
    ) -> Result<Enrollment, EnrollmentError> {
        if !final_grade.is_finite() || !(0.0..=100.0).contains(&final_grade) {
            return Err(EnrollmentError::InvalidGrade(final_grade));
        }

        let enrollment = self.fetch_enrollment(enrollment_id)?;
        if enrollment.status != EnrollmentStatus::Active {
            return Err(EnrollmentError::AlreadyTerminal(enrollment.status.label()));
        }

        let completed = Enrollment {
            status: EnrollmentStatus::Completed,
            progress_percentage: 100.0,
            final_grade: Some(final_grade),
            completed_at: Some(now),
            ..enrollment
        };
        self.write_enrollment(&completed)?;

        info!(enrollment = %completed.id, final_grade, "enrollment completed");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Student(completed.student.clone()),
                NotificationKind::EnrollmentCompleted,
            )
            .with("enrollment_id", &completed.id)
            .with("course_id", &completed.course)
            .with("final_grade", format!("{final_grade:.1}")),
        );

        Ok(completed)
    }

    pub fn drop_enrollment(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<Enrollment, EnrollmentError> {
        let enrollment = self.fetch_enrollment(enrollment_id)?;
        if enrollment.status != EnrollmentStatus::Active {
            return Err(EnrollmentError::AlreadyTerminal(enrollment.status.label()));
        }

        let dropped = Enrollment {
            status: EnrollmentStatus::Dropped,
            ..enrollment
        };
        self.write_enrollment(&dropped)?;
        info!(enrollment = %dropped.id, "enrollment dropped");
        Ok(dropped)
    }

    pub fn get_request(
        &self,
        request_id: &EnrollmentRequestId,
    ) -> Result<EnrollmentRequest, EnrollmentError> {
        self.fetch_request(request_id)
    }

    pub fn get_enrollment(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<Enrollment, EnrollmentError> {
        self.fetch_enrollment(enrollment_id)
    }

    /// Parents to contact for a minor. Without a linked parent, `parent_info` describes the
    /// guardian that is matched or provisioned together with the request.
    fn parent_contacts(
        &self,
        student: &Student,
        parent_info: Option<ParentInfo>,
        now: DateTime<Utc>,
    ) -> Result<ParentContacts, EnrollmentError> {
        let mut parents = Vec::new();
        for link in self.store.links_for_student(&student.id)? {
            match self.store.parent(&link.parent)? {
                Some(parent) => parents.push(parent),
                None => warn!(parent = %link.parent, student = %student.id, "link points at a missing parent"),
            }
        }
        if !parents.is_empty() {
            return Ok(ParentContacts::Linked(parents));
        }

        let info = parent_info.ok_or(EnrollmentError::ParentInfoRequired)?;
        let email = info.email.trim().to_ascii_lowercase();
        let name = info.name.trim().to_string();
        if name.is_empty() {
            return Err(EnrollmentError::InvalidParentInfo("parent name is required"));
        }
        if !email.contains('@') {
            return Err(EnrollmentError::InvalidParentInfo(
                "parent email must be a valid address",
            ));
        }

        Ok(ParentContacts::Guardian(GuardianLink {
            account: NewParentAccount {
                name,
                email,
                phone: info.phone,
                preferences: ContactPreferences::default(),
                temporary_credential: temporary_credential(),
            },
            relationship: info.relationship,
            linked_at: now,
        }))
    }

    fn insert_request(
        &self,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentRequest, EnrollmentError> {
        self.store
            .insert_enrollment_request(request)
            .map_err(duplicate_on_conflict)
    }

    fn announce(
        &self,
        request: &EnrollmentRequest,
        student: &Student,
        course: &Course,
        outreach: Outreach,
    ) {
        let notice = |recipient: Recipient, kind: NotificationKind| {
            Notification::new(recipient, kind)
                .with("request_id", &request.id)
                .with("student_name", &student.name)
                .with("course_title", &course.title)
                .with("frequency", request.frequency.label())
                .with("quoted_price", request.quoted_price)
                .with("currency", &request.currency)
        };

        match outreach {
            Outreach::ExistingParents(parents) => {
                for parent in parents {
                    dispatch(
                        self.notifier.as_ref(),
                        notice(
                            Recipient::Parent(parent.id),
                            NotificationKind::EnrollmentParentNotice,
                        ),
                    );
                }
            }
            Outreach::MatchedParent(parent) => {
                dispatch(
                    self.notifier.as_ref(),
                    notice(
                        Recipient::Parent(parent.id),
                        NotificationKind::EnrollmentParentNotice,
                    ),
                );
            }
            Outreach::ProvisionedParent {
                account,
                credential,
            } => {
                dispatch(
                    self.notifier.as_ref(),
                    notice(
                        Recipient::Parent(account.id),
                        NotificationKind::ParentAccountCreated,
                    )
                    .with("login_email", &account.email)
                    .with("temporary_password", credential),
                );
            }
            Outreach::Student => {
                dispatch(
                    self.notifier.as_ref(),
                    notice(
                        Recipient::Student(student.id.clone()),
                        NotificationKind::EnrollmentPaymentRequired,
                    ),
                );
            }
        }
    }

    fn write_request(
        &self,
        updated: &EnrollmentRequest,
        expected: EnrollmentRequestStatus,
        event: EnrollmentEvent,
    ) -> Result<(), EnrollmentError> {
        if self.store.update_enrollment_request(updated, expected)? {
            Ok(())
        } else {
            Err(EnrollmentError::InvalidState(InvalidTransition {
                from: "processed",
                event: event.label(),
            }))
        }
    }

    fn write_enrollment(&self, updated: &Enrollment) -> Result<(), EnrollmentError> {
        if self
            .store
            .update_enrollment(updated, EnrollmentStatus::Active)?
        {
            Ok(())
        } else {
            let current = self.fetch_enrollment(&updated.id)?;
            Err(EnrollmentError::AlreadyTerminal(current.status.label()))
        }
    }

    fn student(&self, id: &StudentId) -> Result<Student, EnrollmentError> {
        self.store
            .student(id)?
            .ok_or_else(|| EnrollmentError::UnknownStudent(id.clone()))
    }

    fn course(&self, id: &CourseId) -> Result<Course, EnrollmentError> {
        self.store
            .course(id)?
            .ok_or_else(|| EnrollmentError::UnknownCourse(id.clone()))
    }

    fn fetch_request(
        &self,
        id: &EnrollmentRequestId,
    ) -> Result<EnrollmentRequest, EnrollmentError> {
        self.store
            .fetch_enrollment_request(id)?
            .ok_or(EnrollmentError::Repository(RepositoryError::NotFound))
    }

    fn fetch_enrollment(&self, id: &EnrollmentId) -> Result<Enrollment, EnrollmentError> {
        self.store
            .fetch_enrollment(id)?
            .ok_or(EnrollmentError::Repository(RepositoryError::NotFound))
    }
}

fn duplicate_on_conflict(error: RepositoryError) -> EnrollmentError {
    match error {
        RepositoryError::Conflict => EnrollmentError::DuplicateOpenRequest,
        other => EnrollmentError::Repository(other),
    }
}

fn temporary_credential() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(TEMPORARY_CREDENTIAL_LEN);
    token
}

/// Error raised by the enrollment workflow.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("student {0} not found")]
    UnknownStudent(StudentId),
    #[error("course {0} not found")]
    UnknownCourse(CourseId),
    #[error("course {0} is not accepting enrollments")]
    CourseInactive(CourseId),
    #[error("course has no price for frequency {0}")]
    UnsupportedFrequency(&'static str),
    #[error("an open enrollment request already exists for this course")]
    DuplicateOpenRequest,
    #[error("student is already actively enrolled in this course")]
    AlreadyEnrolled,
    #[error("parent information is required to enroll a minor without a linked parent")]
    ParentInfoRequired,
    #[error("invalid parent information: {0}")]
    InvalidParentInfo(&'static str),
    #[error("a rejection reason is required")]
    ReasonRequired,
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidTransition),
    #[error("enrollment is already {0}")]
    AlreadyTerminal(&'static str),
    #[error("final grade {0} must be between 0 and 100")]
    InvalidGrade(f32),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
