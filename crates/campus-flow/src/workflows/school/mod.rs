//! Records and collaborator seams shared by every school workflow.

pub mod academics;
pub mod domain;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod memory;
pub mod notify;
pub mod repository;

pub use academics::{Assignment, AttendanceRecord, AttendanceStatus, ClassSession, Submission};
pub use domain::{
    AcademicLevel, AssignmentId, ContactChannel, ContactPreferences, Course, CourseId,
    EnrollmentId, EnrollmentRequestId, Frequency, FrequencyPricing, InvalidTransition, LevelId,
    LinkPermissions, LinkRequestId, ParentAccount, ParentId, ParentStudentLink, PaymentId,
    PromotionId, Relationship, SessionId, Student, StudentId, StudentStatus, SubscriptionId,
    UserId,
};
pub use memory::{InMemorySchoolStore, RecordingNotifier};
pub use notify::{Notification, NotificationKind, Notifier, NotifyError, Recipient};
pub use repository::{
    AcademicRecords, AccountDirectory, NewParentAccount, RepositoryError, SchoolDirectory,
};
