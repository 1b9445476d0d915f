use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::metrics::{attendance_rate, overall_progress};
use super::views::{ChildProgress, EnrollmentSummary, ParentDashboard, StudentProgress};
use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{EnrollmentRepository, EnrollmentRequestView};
use crate::workflows::linking::{LinkRequestView, LinkingRepository};
use crate::workflows::payments::{
    PaymentRepository, PaymentStatus, PaymentView, SubscriptionStatus, SubscriptionView,
};
use crate::workflows::school::domain::{CourseId, ParentId, ParentStudentLink, StudentId};
use crate::workflows::school::repository::RepositoryError;

/// Everything the read-side needs to assemble progress and dashboards.
pub trait ReportingSource: EnrollmentRepository + PaymentRepository + LinkingRepository {}

impl<T> ReportingSource for T where T: EnrollmentRepository + PaymentRepository + LinkingRepository {}

/// Read-only progress queries for students and their parents.
pub struct ProgressReporter<S> {
    store: Arc<S>,
    expiry_warning_days: i64,
}

impl<S> ProgressReporter<S>
where
    S: ReportingSource + 'static,
{
    pub fn new(store: Arc<S>, config: &WorkflowConfig) -> Self {
        Self {
            store,
            expiry_warning_days: config.expiry_warning_days,
        }
    }

    pub fn calculate_overall_progress(&self, student: &StudentId) -> Result<f32, ReportingError> {
        self.ensure_student(student)?;
        let enrollments = self.store.enrollments_for_student(student)?;
        Ok(overall_progress(&enrollments))
    }

    pub fn calculate_attendance_rate(&self, student: &StudentId) -> Result<f32, ReportingError> {
        self.ensure_student(student)?;
        let records = self.store.attendance_for_student(student)?;
        Ok(attendance_rate(&records))
    }

    pub fn student_progress(&self, student: &StudentId) -> Result<StudentProgress, ReportingError> {
        Ok(StudentProgress {
            overall_progress: self.calculate_overall_progress(student)?,
            attendance_rate: self.calculate_attendance_rate(student)?,
        })
    }

    /// One entry per linked child, filtered by what each link permits.
    pub fn get_children_progress(
        &self,
        parent: &ParentId,
    ) -> Result<Vec<ChildProgress>, ReportingError> {
        self.ensure_parent(parent)?;
        let mut titles = HashMap::new();
        let mut children = Vec::new();
        for link in self.store.links_for_parent(parent)? {
            if let Some(child) = self.child_progress(&link, &mut titles)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    pub fn get_parent_dashboard(
        &self,
        parent: &ParentId,
        today: NaiveDate,
    ) -> Result<ParentDashboard, ReportingError> {
        let children = self.get_children_progress(parent)?;
        let child_ids: Vec<StudentId> = children.iter().map(|child| child.student.clone()).collect();

        let pending_link_requests = self
            .store
            .pending_link_requests()?
            .iter()
            .filter(|request| &request.parent == parent)
            .map(LinkRequestView::from)
            .collect();

        let mut open_enrollment_requests = Vec::new();
        let mut expiring_subscriptions = Vec::new();
        for child in &child_ids {
            open_enrollment_requests.extend(
                self.store
                    .enrollment_requests_for_student(child)?
                    .iter()
                    .filter(|request| !request.status.is_terminal())
                    .map(EnrollmentRequestView::from),
            );
            expiring_subscriptions.extend(
                self.store
                    .subscriptions_for_student(child)?
                    .iter()
                    .filter(|subscription| {
                        subscription.status == SubscriptionStatus::Active
                            && subscription.end_date >= today
                            && subscription.days_remaining(today) <= self.expiry_warning_days
                    })
                    .map(SubscriptionView::from),
            );
        }

        let pending_payments = self
            .store
            .payments_for_parent(parent, &child_ids)?
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Pending)
            .map(PaymentView::from)
            .collect();

        debug!(parent = %parent, children = children.len(), "parent dashboard assembled");
        Ok(ParentDashboard {
            parent: parent.clone(),
            generated_on: today,
            children,
            pending_link_requests,
            open_enrollment_requests,
            pending_payments,
            expiring_subscriptions,
        })
    }

    fn child_progress(
        &self,
        link: &ParentStudentLink,
        titles: &mut HashMap<CourseId, String>,
    ) -> Result<Option<ChildProgress>, ReportingError> {
        let Some(student) = self.store.student(&link.student)? else {
            return Ok(None);
        };

        let enrollments = self.store.enrollments_for_student(&student.id)?;
        let current_level = match &student.current_level {
            Some(level) => self.store.level(level)?.map(|level| level.name),
            None => None,
        };

        let summaries = if link.permissions.can_view_grades {
            let mut summaries = Vec::with_capacity(enrollments.len());
            for enrollment in &enrollments {
                let course_title = match titles.get(&enrollment.course) {
                    Some(title) => title.clone(),
                    None => {
                        let title = self
                            .store
                            .course(&enrollment.course)?
                            .map(|course| course.title)
                            .unwrap_or_else(|| enrollment.course.to_string());
                        titles.insert(enrollment.course.clone(), title.clone());
                        title
                    }
                };
                summaries.push(EnrollmentSummary {
                    enrollment_id: enrollment.id.clone(),
                    course: enrollment.course.clone(),
                    course_title,
                    status: enrollment.status.label(),
                    progress_percentage: enrollment.progress_percentage,
                    final_grade: enrollment.final_grade,
                });
            }
            Some(summaries)
        } else {
            None
        };

        let attendance = if link.permissions.can_view_attendance {
            Some(attendance_rate(
                &self.store.attendance_for_student(&student.id)?,
            ))
        } else {
            None
        };

        Ok(Some(ChildProgress {
            student: student.id,
            name: student.name,
            relationship: link.relationship.label(),
            current_level,
            overall_progress: overall_progress(&enrollments),
            enrollments: summaries,
            attendance_rate: attendance,
        }))
    }

    fn ensure_student(&self, student: &StudentId) -> Result<(), ReportingError> {
        match self.store.student(student)? {
            Some(_) => Ok(()),
            None => Err(ReportingError::UnknownStudent(student.clone())),
        }
    }

    fn ensure_parent(&self, parent: &ParentId) -> Result<(), ReportingError> {
        match self.store.parent(parent)? {
            Some(_) => Ok(()),
            None => Err(ReportingError::UnknownParent(parent.clone())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    #[error("student {0} not found")]
    UnknownStudent(StudentId),
    #[error("parent {0} not found")]
    UnknownParent(ParentId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
