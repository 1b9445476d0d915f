//! In-process implementations of the repository and notifier seams, used by the demo, the
//! service's default wiring, and the test suites.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::academics::{Assignment, AttendanceRecord, ClassSession, Submission};
use super::domain::{
    AcademicLevel, AssignmentId, Course, CourseId, EnrollmentId, EnrollmentRequestId, LevelId,
    LinkPermissions, LinkRequestId, ParentAccount, ParentId, ParentStudentLink, PaymentId,
    PromotionId, Student, StudentId, SubscriptionId, UserId,
};
use super::notify::{Notification, Notifier, NotifyError};
use super::repository::{
    AcademicRecords, AccountDirectory, RepositoryError, SchoolDirectory,
};
use crate::workflows::enrollment::{
    Enrollment, EnrollmentRepository, EnrollmentRequest, EnrollmentRequestStatus,
    EnrollmentStatus, GuardianLink, GuardianOutcome,
};
use crate::workflows::linking::{ChildLinkingRequest, LinkRequestStatus, LinkingRepository};
use crate::workflows::payments::{
    Payer, Payment, PaymentRepository, PaymentStatus, Subscription, SubscriptionStatus,
};
use crate::workflows::promotion::{PromotionRepository, PromotionStatus, StudentPromotion};

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<StudentId, Student>,
    levels: BTreeMap<LevelId, AcademicLevel>,
    courses: BTreeMap<CourseId, Course>,
    parents: BTreeMap<ParentId, ParentAccount>,
    links: BTreeMap<(ParentId, StudentId), ParentStudentLink>,
    sessions: Vec<ClassSession>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    submissions: Vec<Submission>,
    attendance: Vec<AttendanceRecord>,
    link_requests: BTreeMap<LinkRequestId, ChildLinkingRequest>,
    enrollment_requests: BTreeMap<EnrollmentRequestId, EnrollmentRequest>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    promotions: BTreeMap<PromotionId, StudentPromotion>,
    payments: BTreeMap<PaymentId, Payment>,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl Tables {
    fn parent_by_email(&self, email: &str) -> Option<&ParentAccount> {
        self.parents
            .values()
            .find(|parent| parent.email.eq_ignore_ascii_case(email))
    }

    fn has_open_request(&self, student: &StudentId, course: &CourseId) -> bool {
        self.enrollment_requests.values().any(|existing| {
            !existing.status.is_terminal()
                && &existing.student == student
                && &existing.course == course
        })
    }
}

/// Single-lock store: every trait call is one critical section, which is what makes the
/// multi-record writes atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemorySchoolStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemorySchoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    fn seed(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_student(&self, student: Student) {
        self.seed().students.insert(student.id.clone(), student);
    }

    pub fn insert_level(&self, level: AcademicLevel) {
        self.seed().levels.insert(level.id.clone(), level);
    }

    pub fn insert_course(&self, course: Course) {
        self.seed().courses.insert(course.id.clone(), course);
    }

    pub fn insert_parent(&self, parent: ParentAccount) {
        self.seed().parents.insert(parent.id.clone(), parent);
    }

    pub fn insert_link(&self, link: ParentStudentLink) {
        self.seed()
            .links
            .insert((link.parent.clone(), link.student.clone()), link);
    }

    pub fn insert_session(&self, session: ClassSession) {
        self.seed().sessions.push(session);
    }

    pub fn insert_assignment(&self, assignment: Assignment) {
        self.seed()
            .assignments
            .insert(assignment.id.clone(), assignment);
    }

    pub fn insert_submission(&self, submission: Submission) {
        let mut tables = self.seed();
        tables.submissions.retain(|existing| {
            !(existing.assignment == submission.assignment
                && existing.student == submission.student)
        });
        tables.submissions.push(submission);
    }

    pub fn insert_attendance(&self, record: AttendanceRecord) {
        self.seed().attendance.push(record);
    }

    pub fn insert_subscription(&self, subscription: Subscription) {
        self.seed()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }
}

impl SchoolDirectory for InMemorySchoolStore {
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        Ok(self.tables()?.students.get(id).cloned())
    }

    fn level(&self, id: &LevelId) -> Result<Option<AcademicLevel>, RepositoryError> {
        Ok(self.tables()?.levels.get(id).cloned())
    }

    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        Ok(self.tables()?.courses.get(id).cloned())
    }

    fn parent(&self, id: &ParentId) -> Result<Option<ParentAccount>, RepositoryError> {
        Ok(self.tables()?.parents.get(id).cloned())
    }

    fn parents(&self) -> Result<Vec<ParentAccount>, RepositoryError> {
        Ok(self.tables()?.parents.values().cloned().collect())
    }

    fn parent_link(
        &self,
        parent: &ParentId,
        student: &StudentId,
    ) -> Result<Option<ParentStudentLink>, RepositoryError> {
        Ok(self
            .tables()?
            .links
            .get(&(parent.clone(), student.clone()))
            .cloned())
    }

    fn links_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<ParentStudentLink>, RepositoryError> {
        Ok(self
            .tables()?
            .links
            .values()
            .filter(|link| &link.student == student)
            .cloned()
            .collect())
    }

    fn links_for_parent(
        &self,
        parent: &ParentId,
    ) -> Result<Vec<ParentStudentLink>, RepositoryError> {
        Ok(self
            .tables()?
            .links
            .values()
            .filter(|link| &link.parent == parent)
            .cloned()
            .collect())
    }
}

impl AccountDirectory for InMemorySchoolStore {
    fn find_parent_by_email(&self, email: &str) -> Result<Option<ParentAccount>, RepositoryError> {
        Ok(self.tables()?.parent_by_email(email).cloned())
    }
}

impl AcademicRecords for InMemorySchoolStore {
    fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, RepositoryError> {
        Ok(self.tables()?.assignments.get(id).cloned())
    }

    fn assignments_for_course(&self, course: &CourseId) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(self
            .tables()?
            .assignments
            .values()
            .filter(|assignment| &assignment.course == course)
            .cloned()
            .collect())
    }

    fn assignments_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(self
            .tables()?
            .assignments
            .values()
            .filter(|assignment| assignment.due_at >= from && assignment.due_at <= to)
            .cloned()
            .collect())
    }

    fn submissions_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        Ok(self
            .tables()?
            .submissions
            .iter()
            .filter(|submission| &submission.student == student)
            .cloned()
            .collect())
    }

    fn ungraded_submissions(&self) -> Result<Vec<Submission>, RepositoryError> {
        Ok(self
            .tables()?
            .submissions
            .iter()
            .filter(|submission| !submission.is_graded())
            .cloned()
            .collect())
    }

    fn sessions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ClassSession>, RepositoryError> {
        Ok(self
            .tables()?
            .sessions
            .iter()
            .filter(|session| session.starts_at >= from && session.starts_at <= to)
            .cloned()
            .collect())
    }

    fn attendance_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        Ok(self
            .tables()?
            .attendance
            .iter()
            .filter(|record| &record.student == student)
            .cloned()
            .collect())
    }
}

impl LinkingRepository for InMemorySchoolStore {
    fn insert_link_request(
        &self,
        request: ChildLinkingRequest,
    ) -> Result<ChildLinkingRequest, RepositoryError> {
        let mut tables = self.tables()?;
        let duplicate = tables.link_requests.values().any(|existing| {
            existing.status == LinkRequestStatus::Pending
                && existing.parent == request.parent
                && existing.student == request.student
        });
        if duplicate || tables.link_requests.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .link_requests
            .insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch_link_request(
        &self,
        id: &LinkRequestId,
    ) -> Result<Option<ChildLinkingRequest>, RepositoryError> {
        Ok(self.tables()?.link_requests.get(id).cloned())
    }

    fn pending_link_request(
        &self,
        parent: &ParentId,
        student: &StudentId,
    ) -> Result<Option<ChildLinkingRequest>, RepositoryError> {
        Ok(self
            .tables()?
            .link_requests
            .values()
            .find(|request| {
                request.status == LinkRequestStatus::Pending
                    && &request.parent == parent
                    && &request.student == student
            })
            .cloned())
    }

    fn pending_link_requests(&self) -> Result<Vec<ChildLinkingRequest>, RepositoryError> {
        let mut pending: Vec<ChildLinkingRequest> = self
            .tables()?
            .link_requests
            .values()
            .filter(|request| request.status == LinkRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|request| request.requested_at);
        Ok(pending)
    }

    fn record_link_review(
        &self,
        reviewed: &ChildLinkingRequest,
        grant: Option<ParentStudentLink>,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let still_pending = tables
            .link_requests
            .get(&reviewed.id)
            .map(|stored| stored.status == LinkRequestStatus::Pending)
            .ok_or(RepositoryError::NotFound)?;
        if !still_pending {
            return Ok(false);
        }

        if let Some(link) = grant {
            let key = (link.parent.clone(), link.student.clone());
            if tables.links.contains_key(&key) {
                return Ok(false);
            }
            tables.links.insert(key, link);
        }
        tables
            .link_requests
            .insert(reviewed.id.clone(), reviewed.clone());
        Ok(true)
    }
}

impl EnrollmentRepository for InMemorySchoolStore {
    fn insert_enrollment_request(
        &self,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentRequest, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.has_open_request(&request.student, &request.course)
            || tables.enrollment_requests.contains_key(&request.id)
        {
            return Err(RepositoryError::Conflict);
        }
        tables
            .enrollment_requests
            .insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn insert_request_with_guardian(
        &self,
        request: EnrollmentRequest,
        guardian: GuardianLink,
    ) -> Result<(EnrollmentRequest, GuardianOutcome), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.has_open_request(&request.student, &request.course)
            || tables.enrollment_requests.contains_key(&request.id)
        {
            return Err(RepositoryError::Conflict);
        }

        let outcome = match tables.parent_by_email(&guardian.account.email) {
            Some(existing) => GuardianOutcome::Matched(existing.clone()),
            None => {
                let parent = ParentAccount {
                    id: ParentId::generate(),
                    user: UserId::generate(),
                    name: guardian.account.name,
                    email: guardian.account.email,
                    phone: guardian.account.phone,
                    preferences: guardian.account.preferences,
                };
                tables.parents.insert(parent.id.clone(), parent.clone());
                GuardianOutcome::Provisioned(parent)
            }
        };
        let parent = match &outcome {
            GuardianOutcome::Matched(parent) | GuardianOutcome::Provisioned(parent) => parent,
        };
        let link = ParentStudentLink {
            parent: parent.id.clone(),
            student: request.student.clone(),
            relationship: guardian.relationship,
            permissions: LinkPermissions::full(),
            linked_at: guardian.linked_at,
        };
        tables
            .links
            .insert((link.parent.clone(), link.student.clone()), link);
        tables
            .enrollment_requests
            .insert(request.id.clone(), request.clone());
        Ok((request, outcome))
    }

    fn fetch_enrollment_request(
        &self,
        id: &EnrollmentRequestId,
    ) -> Result<Option<EnrollmentRequest>, RepositoryError> {
        Ok(self.tables()?.enrollment_requests.get(id).cloned())
    }

    fn open_enrollment_requests(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<Vec<EnrollmentRequest>, RepositoryError> {
        Ok(self
            .tables()?
            .enrollment_requests
            .values()
            .filter(|request| {
                !request.status.is_terminal()
                    && &request.student == student
                    && &request.course == course
            })
            .cloned()
            .collect())
    }

    fn enrollment_requests_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<EnrollmentRequest>, RepositoryError> {
        let mut requests: Vec<EnrollmentRequest> = self
            .tables()?
            .enrollment_requests
            .values()
            .filter(|request| &request.student == student)
            .cloned()
            .collect();
        requests.sort_by_key(|request| request.requested_at);
        Ok(requests)
    }

    fn update_enrollment_request(
        &self,
        updated: &EnrollmentRequest,
        expected: EnrollmentRequestStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .enrollment_requests
            .get_mut(&updated.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Ok(false);
        }
        *stored = updated.clone();
        Ok(true)
    }

    fn record_enrollment_approval(
        &self,
        approved: &EnrollmentRequest,
        expected: EnrollmentRequestStatus,
        enrollment: Enrollment,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .enrollment_requests
            .get(&approved.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected || stored.enrollment.is_some() {
            return Ok(false);
        }
        tables
            .enrollment_requests
            .insert(approved.id.clone(), approved.clone());
        tables.enrollments.insert(enrollment.id.clone(), enrollment);
        Ok(true)
    }

    fn insert_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.enrollments.contains_key(&enrollment.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .enrollments
            .insert(enrollment.id.clone(), enrollment.clone());
        Ok(enrollment)
    }

    fn fetch_enrollment(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError> {
        Ok(self.tables()?.enrollments.get(id).cloned())
    }

    fn enrollments_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Enrollment>, RepositoryError> {
        Ok(self
            .tables()?
            .enrollments
            .values()
            .filter(|enrollment| &enrollment.student == student)
            .cloned()
            .collect())
    }

    fn enrollments_for_course(
        &self,
        course: &CourseId,
    ) -> Result<Vec<Enrollment>, RepositoryError> {
        Ok(self
            .tables()?
            .enrollments
            .values()
            .filter(|enrollment| &enrollment.course == course)
            .cloned()
            .collect())
    }

    fn update_enrollment(
        &self,
        updated: &Enrollment,
        expected: EnrollmentStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .enrollments
            .get_mut(&updated.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Ok(false);
        }
        *stored = updated.clone();
        Ok(true)
    }
}

impl PromotionRepository for InMemorySchoolStore {
    fn insert_promotion(
        &self,
        promotion: StudentPromotion,
    ) -> Result<StudentPromotion, RepositoryError> {
        let mut tables = self.tables()?;
        let pending = tables.promotions.values().any(|existing| {
            existing.status == PromotionStatus::Pending && existing.student == promotion.student
        });
        if pending || tables.promotions.contains_key(&promotion.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .promotions
            .insert(promotion.id.clone(), promotion.clone());
        Ok(promotion)
    }

    fn fetch_promotion(
        &self,
        id: &PromotionId,
    ) -> Result<Option<StudentPromotion>, RepositoryError> {
        Ok(self.tables()?.promotions.get(id).cloned())
    }

    fn pending_promotion_for(
        &self,
        student: &StudentId,
    ) -> Result<Option<StudentPromotion>, RepositoryError> {
        Ok(self
            .tables()?
            .promotions
            .values()
            .find(|promotion| {
                promotion.status == PromotionStatus::Pending && &promotion.student == student
            })
            .cloned())
    }

    fn promotions_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<StudentPromotion>, RepositoryError> {
        let mut history: Vec<StudentPromotion> = self
            .tables()?
            .promotions
            .values()
            .filter(|promotion| &promotion.student == student)
            .cloned()
            .collect();
        history.sort_by_key(|promotion| promotion.proposed_at);
        Ok(history)
    }

    fn update_pending_promotion(
        &self,
        updated: &StudentPromotion,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .promotions
            .get_mut(&updated.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != PromotionStatus::Pending {
            return Ok(false);
        }
        *stored = updated.clone();
        Ok(true)
    }

    fn delete_pending_promotion(&self, id: &PromotionId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        match tables.promotions.get(id) {
            Some(stored) if stored.status == PromotionStatus::Pending => {
                tables.promotions.remove(id);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn apply_promotion(
        &self,
        completed: &StudentPromotion,
        student: &Student,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let still_pending = tables
            .promotions
            .get(&completed.id)
            .map(|stored| stored.status == PromotionStatus::Pending)
            .ok_or(RepositoryError::NotFound)?;
        if !still_pending {
            return Ok(false);
        }
        if !tables.students.contains_key(&student.id) {
            return Err(RepositoryError::NotFound);
        }

        tables.students.insert(student.id.clone(), student.clone());
        tables
            .promotions
            .insert(completed.id.clone(), completed.clone());
        Ok(true)
    }
}

impl PaymentRepository for InMemorySchoolStore {
    fn insert_payment(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.payments.contains_key(&payment.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.payments.insert(payment.id.clone(), payment.clone());
        Ok(payment)
    }

    fn fetch_payment(&self, id: &PaymentId) -> Result<Option<Payment>, RepositoryError> {
        Ok(self.tables()?.payments.get(id).cloned())
    }

    fn pending_payments(&self) -> Result<Vec<Payment>, RepositoryError> {
        let mut pending: Vec<Payment> = self
            .tables()?
            .payments
            .values()
            .filter(|payment| payment.status == PaymentStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|payment| payment.submitted_at);
        Ok(pending)
    }

    fn payments_for_parent(
        &self,
        parent: &ParentId,
        children: &[StudentId],
    ) -> Result<Vec<Payment>, RepositoryError> {
        Ok(self
            .tables()?
            .payments
            .values()
            .filter(|payment| {
                matches!(&payment.payer, Payer::Parent(payer) if payer == parent)
                    || children.contains(&payment.student)
            })
            .cloned()
            .collect())
    }

    fn payments_for_student(&self, student: &StudentId) -> Result<Vec<Payment>, RepositoryError> {
        Ok(self
            .tables()?
            .payments
            .values()
            .filter(|payment| &payment.student == student)
            .cloned()
            .collect())
    }

    fn subscription_for(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(self
            .tables()?
            .subscriptions
            .values()
            .find(|subscription| {
                &subscription.student == student && &subscription.course == course
            })
            .cloned())
    }

    fn subscriptions_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(self
            .tables()?
            .subscriptions
            .values()
            .filter(|subscription| &subscription.student == student)
            .cloned()
            .collect())
    }

    fn subscriptions_with_status(
        &self,
        status: SubscriptionStatus,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(self
            .tables()?
            .subscriptions
            .values()
            .filter(|subscription| subscription.status == status)
            .cloned()
            .collect())
    }

    fn record_payment_review(
        &self,
        reviewed: &Payment,
        expected: PaymentStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .payments
            .get(&reviewed.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Ok(false);
        }
        tables.payments.insert(reviewed.id.clone(), reviewed.clone());
        Ok(true)
    }

    fn record_payment_verification(
        &self,
        verified: &Payment,
        weeks: u32,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .payments
            .get(&verified.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != PaymentStatus::Pending {
            return Ok(None);
        }

        let subscription = match tables.subscriptions.values().find(|subscription| {
            subscription.student == verified.student && subscription.course == verified.course
        }) {
            Some(current) => current.extend(verified, weeks),
            None => Subscription::open(verified, weeks),
        };
        tables.payments.insert(verified.id.clone(), verified.clone());
        tables
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(Some(subscription))
    }

    fn update_subscription(
        &self,
        updated: &Subscription,
        expected: SubscriptionStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .subscriptions
            .get_mut(&updated.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Ok(false);
        }
        *stored = updated.clone();
        Ok(true)
    }
}

/// Notifier that keeps every notification in memory. An offline recorder rejects
/// everything, which is how tests exercise delivery failures.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
    offline: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.offline {
            return Err(NotifyError::Transport("recorder offline".to_string()));
        }
        self.events
            .lock()
            .map_err(|_| NotifyError::Transport("recorder lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}
