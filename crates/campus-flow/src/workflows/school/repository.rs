use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::academics::{Assignment, AttendanceRecord, ClassSession, Submission};
use super::domain::{
    AcademicLevel, AssignmentId, ContactPreferences, Course, CourseId, LevelId, ParentAccount, ParentId,
    ParentStudentLink, Student, StudentId,
};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the shared school records every workflow consults.
pub trait SchoolDirectory: Send + Sync {
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    fn level(&self, id: &LevelId) -> Result<Option<AcademicLevel>, RepositoryError>;
    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError>;
    fn parent(&self, id: &ParentId) -> Result<Option<ParentAccount>, RepositoryError>;
    fn parents(&self) -> Result<Vec<ParentAccount>, RepositoryError>;
    fn parent_link(
        &self,
        parent: &ParentId,
        student: &StudentId,
    ) -> Result<Option<ParentStudentLink>, RepositoryError>;
    fn links_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<ParentStudentLink>, RepositoryError>;
    fn links_for_parent(&self, parent: &ParentId)
        -> Result<Vec<ParentStudentLink>, RepositoryError>;
}

/// Details for a parent login created on a family's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParentAccount {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferences: ContactPreferences,
    /// One-time password; the directory stores only what it needs to verify it.
    pub temporary_credential: String,
}

/// User account lookups used when parents are matched during enrollment.
pub trait AccountDirectory: Send + Sync {
    fn find_parent_by_email(&self, email: &str) -> Result<Option<ParentAccount>, RepositoryError>;
}

/// Coursework and attendance records read by progress, reporting, and reminder jobs.
pub trait AcademicRecords: Send + Sync {
    fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, RepositoryError>;
    fn assignments_for_course(&self, course: &CourseId) -> Result<Vec<Assignment>, RepositoryError>;
    fn assignments_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, RepositoryError>;
    fn submissions_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Submission>, RepositoryError>;
    fn ungraded_submissions(&self) -> Result<Vec<Submission>, RepositoryError>;
    fn sessions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ClassSession>, RepositoryError>;
    fn attendance_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;
}
