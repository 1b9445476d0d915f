use chrono::Duration;

use super::common::*;

use crate::workflows::enrollment::{EnrollmentError, EnrollmentStatus};
use crate::workflows::school::academics::{Assignment, Submission};
use crate::workflows::school::domain::{AssignmentId, CourseId, StudentId};
use crate::workflows::school::fixtures::{admin, now, ADULT, MATH};
use crate::workflows::school::notify::NotificationKind;

fn assignment(id: &str) -> Assignment {
    Assignment {
        id: AssignmentId::from(id),
        course: CourseId::from(MATH),
        title: id.to_string(),
        due_at: now() + Duration::days(7),
    }
}

fn graded(assignment: &str, student: &str) -> Submission {
    Submission {
        assignment: AssignmentId::from(assignment),
        student: StudentId::from(student),
        submitted_at: now(),
        score: Some(90.0),
        graded_at: Some(now()),
    }
}

#[test]
fn direct_enrollment_refuses_duplicates() {
    let (service, _, _) = build_service();
    let student = StudentId::from(ADULT);
    let course = CourseId::from(MATH);

    let enrollment = service
        .enroll_directly(&student, &course, &admin(), now())
        .expect("enrolls");
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
    assert_eq!(enrollment.request, None);

    assert!(matches!(
        service.enroll_directly(&student, &course, &admin(), now()),
        Err(EnrollmentError::AlreadyEnrolled)
    ));
}

#[test]
fn progress_follows_graded_assignments() {
    let (service, store, _) = build_service();
    for id in ["asg-1", "asg-2", "asg-3"] {
        store.insert_assignment(assignment(id));
    }
    let enrollment = service
        .enroll_directly(&StudentId::from(ADULT), &CourseId::from(MATH), &admin(), now())
        .expect("enrolls");

    store.insert_submission(graded("asg-1", ADULT));
    let updated = service.update_progress(&enrollment.id).expect("progress");
    assert_eq!(updated.progress_percentage, 33.33);

    let again = service.update_progress(&enrollment.id).expect("idempotent");
    assert_eq!(again.progress_percentage, 33.33);
}

#[test]
fn completion_validates_grade_and_status() {
    let (service, _, notifier) = build_service();
    let enrollment = service
        .enroll_directly(&StudentId::from(ADULT), &CourseId::from(MATH), &admin(), now())
        .expect("enrolls");

    assert!(matches!(
        service.complete(&enrollment.id, 120.0, now()),
        Err(EnrollmentError::InvalidGrade(_))
    ));

    let completed = service
        .complete(&enrollment.id, 88.5, now())
        .expect("completes");
    assert_eq!(completed.status, EnrollmentStatus::Completed);
    assert_eq!(completed.progress_percentage, 100.0);
    assert_eq!(completed.final_grade, Some(88.5));
    assert_eq!(completed.completed_at, Some(now()));

    assert!(matches!(
        service.complete(&enrollment.id, 90.0, now()),
        Err(EnrollmentError::AlreadyTerminal("completed"))
    ));
    assert!(matches!(
        service.drop_enrollment(&enrollment.id),
        Err(EnrollmentError::AlreadyTerminal("completed"))
    ));

    // Progress recomputation leaves completed enrollments alone.
    let unchanged = service.update_progress(&enrollment.id).expect("no-op");
    assert_eq!(unchanged.progress_percentage, 100.0);

    let last = notifier.events().pop().expect("completion notice");
    assert_eq!(last.kind, NotificationKind::EnrollmentCompleted);
    assert_eq!(last.details["final_grade"], "88.5");
}

#[test]
fn dropping_an_active_enrollment() {
    let (service, _, _) = build_service();
    let enrollment = service
        .enroll_directly(&StudentId::from(ADULT), &CourseId::from(MATH), &admin(), now())
        .expect("enrolls");

    let dropped = service.drop_enrollment(&enrollment.id).expect("drops");
    assert_eq!(dropped.status, EnrollmentStatus::Dropped);
    assert!(matches!(
        service.drop_enrollment(&enrollment.id),
        Err(EnrollmentError::AlreadyTerminal("dropped"))
    ));
}
