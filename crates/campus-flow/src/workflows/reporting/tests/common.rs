use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{Enrollment, EnrollmentRepository, EnrollmentStatus};
use crate::workflows::reporting::ProgressReporter;
use crate::workflows::school::academics::{AttendanceRecord, AttendanceStatus};
use crate::workflows::school::domain::{CourseId, SessionId, StudentId};
use crate::workflows::school::fixtures::{now, seeded_store, LINKED_MINOR, MATH, PIANO};
use crate::workflows::school::InMemorySchoolStore;

pub(super) type Reporter = ProgressReporter<InMemorySchoolStore>;

pub(super) fn build_reporter() -> (Arc<Reporter>, InMemorySchoolStore) {
    let store = seeded_store();
    let reporter = Arc::new(ProgressReporter::new(
        Arc::new(store.clone()),
        &WorkflowConfig::default(),
    ));
    (reporter, store)
}

/// Cara finished mathematics and is 40% through piano; four attendance marks give 66.7%.
pub(super) fn seed_coursework(store: &InMemorySchoolStore) {
    let student = StudentId::from(LINKED_MINOR);
    let completed = Enrollment {
        status: EnrollmentStatus::Completed,
        progress_percentage: 100.0,
        final_grade: Some(88.5),
        ..Enrollment::start(student.clone(), CourseId::from(MATH), None, now())
    };
    let active = Enrollment {
        progress_percentage: 40.0,
        ..Enrollment::start(student.clone(), CourseId::from(PIANO), None, now())
    };
    store.insert_enrollment(completed).expect("completed enrollment");
    store.insert_enrollment(active).expect("active enrollment");

    for (index, status) in [
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::Absent,
        AttendanceStatus::Excused,
    ]
    .into_iter()
    .enumerate()
    {
        store.insert_attendance(AttendanceRecord {
            session: SessionId(format!("ses-{index}")),
            student: student.clone(),
            status,
        });
    }
}
