use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{Enrollment, EnrollmentRepository, EnrollmentStatus};
use crate::workflows::jobs::ScheduledJobs;
use crate::workflows::school::academics::{Assignment, ClassSession, Submission};
use crate::workflows::school::domain::{AssignmentId, CourseId, SessionId, StudentId, UserId};
use crate::workflows::school::fixtures::{now, seeded_store, INSTRUCTOR};
use crate::workflows::school::{InMemorySchoolStore, RecordingNotifier};

pub(super) type Jobs = ScheduledJobs<InMemorySchoolStore, RecordingNotifier>;

pub(super) fn build_jobs() -> (Arc<Jobs>, InMemorySchoolStore, RecordingNotifier) {
    build_with_notifier(RecordingNotifier::new())
}

pub(super) fn build_with_notifier(
    notifier: RecordingNotifier,
) -> (Arc<Jobs>, InMemorySchoolStore, RecordingNotifier) {
    let store = seeded_store();
    let jobs = Arc::new(ScheduledJobs::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        &WorkflowConfig::default(),
    ));
    (jobs, store, notifier)
}

pub(super) fn enroll(store: &InMemorySchoolStore, student: &str, course: &str, status: EnrollmentStatus) {
    let enrollment = Enrollment {
        status,
        ..Enrollment::start(StudentId::from(student), CourseId::from(course), None, now())
    };
    store.insert_enrollment(enrollment).expect("enrollment");
}

pub(super) fn session(id: &str, course: &str, starts_at: DateTime<Utc>, cancelled: bool) -> ClassSession {
    ClassSession {
        id: SessionId::from(id),
        course: CourseId::from(course),
        instructor: UserId::from(INSTRUCTOR),
        title: format!("{course} session"),
        starts_at,
        cancelled,
    }
}

pub(super) fn assignment(id: &str, course: &str, due_at: DateTime<Utc>) -> Assignment {
    Assignment {
        id: AssignmentId::from(id),
        course: CourseId::from(course),
        title: format!("{id} worksheet"),
        due_at,
    }
}

pub(super) fn submission(assignment: &str, student: &str, score: Option<f32>) -> Submission {
    Submission {
        assignment: AssignmentId::from(assignment),
        student: StudentId::from(student),
        submitted_at: now(),
        score,
        graded_at: score.map(|_| now()),
    }
}
