//! Read-only progress, attendance and dashboard queries for students and parents.

pub mod metrics;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use metrics::{attendance_rate, overall_progress};
pub use router::reporting_router;
pub use service::{ProgressReporter, ReportingError, ReportingSource};
pub use views::{ChildProgress, EnrollmentSummary, ParentDashboard, StudentProgress};
