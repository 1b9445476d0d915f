//! Course enrollment requests and the enrollments they produce.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    progress_percentage, Enrollment, EnrollmentEvent, EnrollmentRequest, EnrollmentRequestStatus,
    EnrollmentStatus, ParentInfo,
};
pub use repository::{EnrollmentRepository, EnrollmentRequestView, GuardianLink, GuardianOutcome};
pub use router::enrollment_router;
pub use service::{EnrollmentError, EnrollmentService};
