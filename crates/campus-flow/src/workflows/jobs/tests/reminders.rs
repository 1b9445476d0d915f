use super::common::*;

use chrono::Duration;

use crate::workflows::enrollment::EnrollmentStatus;
use crate::workflows::jobs::BatchOutcome;
use crate::workflows::school::domain::{ContactPreferences, ParentId, StudentId, UserId};
use crate::workflows::school::fixtures::{
    link, now, parent, today, ADULT, INSTRUCTOR, LINKED_MINOR, LINKED_PARENT, MATH, MINOR, PIANO,
};
use crate::workflows::school::notify::{NotificationKind, Recipient};
use crate::workflows::school::{LinkPermissions, RecordingNotifier};

#[test]
fn class_reminders_cover_upcoming_sessions_for_active_enrollees() {
    let (jobs, store, notifier) = build_jobs();
    enroll(&store, ADULT, MATH, EnrollmentStatus::Active);
    enroll(&store, MINOR, MATH, EnrollmentStatus::Dropped);
    store.insert_session(session("ses-soon", MATH, now() + Duration::hours(2), false));
    store.insert_session(session("ses-off", MATH, now() + Duration::hours(3), true));
    store.insert_session(session("ses-later", MATH, now() + Duration::hours(30), false));

    let outcome = jobs.send_class_reminders(now()).expect("batch");
    assert_eq!(
        outcome,
        BatchOutcome {
            processed: 1,
            notified: 1,
            failed: 0
        }
    );

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationKind::ClassReminder);
    assert_eq!(events[0].recipient, Recipient::Student(StudentId::from(ADULT)));
    assert_eq!(events[0].details["session_id"], "ses-soon");
}

#[test]
fn assignment_reminders_skip_students_who_submitted() {
    let (jobs, store, notifier) = build_jobs();
    enroll(&store, ADULT, MATH, EnrollmentStatus::Active);
    enroll(&store, LINKED_MINOR, MATH, EnrollmentStatus::Active);
    store.insert_assignment(assignment("asg-fractions", MATH, now() + Duration::hours(5)));
    store.insert_submission(submission("asg-fractions", LINKED_MINOR, None));

    let outcome = jobs.send_assignment_due_reminders(now()).expect("batch");
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.notified, 1);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationKind::AssignmentDue);
    assert_eq!(events[0].recipient, Recipient::Student(StudentId::from(ADULT)));
}

#[test]
fn grading_reminders_group_by_instructor() {
    let (jobs, store, notifier) = build_jobs();
    store.insert_assignment(assignment("asg-fractions", MATH, now() - Duration::days(2)));
    store.insert_assignment(assignment("asg-scales", PIANO, now() - Duration::days(1)));
    store.insert_submission(submission("asg-fractions", ADULT, None));
    store.insert_submission(submission("asg-scales", ADULT, None));
    store.insert_submission(submission("asg-fractions", LINKED_MINOR, Some(91.0)));

    let outcome = jobs.send_pending_grading_reminders(now()).expect("batch");
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.notified, 1);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, Recipient::User(UserId::from(INSTRUCTOR)));
    assert_eq!(events[0].details["pending_count"], "2");
    assert_eq!(events[0].details["courses"], "Mathematics, Piano");
}

#[test]
fn weekly_reports_go_to_opted_in_parents_with_children() {
    let (jobs, store, notifier) = build_jobs();
    let mut quiet = parent("par-fay", "Fay", "fay@example.test");
    quiet.preferences = ContactPreferences {
        weekly_reports: false,
        ..ContactPreferences::default()
    };
    store.insert_parent(quiet);
    store.insert_link(link("par-fay", MINOR, LinkPermissions::full()));

    let outcome = jobs.send_weekly_parent_reports(today()).expect("batch");
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.notified, 1);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    let report = &events[0];
    assert_eq!(report.kind, NotificationKind::WeeklyParentReport);
    assert_eq!(report.recipient, Recipient::Parent(ParentId::from(LINKED_PARENT)));
    assert_eq!(report.details["children"], "1");
    assert!(report.details.contains_key(&format!("child.{LINKED_MINOR}")));
}

#[test]
fn delivery_failures_are_counted_not_fatal() {
    let (jobs, store, _) = build_with_notifier(RecordingNotifier::offline());
    enroll(&store, ADULT, MATH, EnrollmentStatus::Active);
    enroll(&store, LINKED_MINOR, MATH, EnrollmentStatus::Active);
    store.insert_session(session("ses-soon", MATH, now() + Duration::hours(1), false));

    let outcome = jobs.send_class_reminders(now()).expect("batch");
    assert_eq!(
        outcome,
        BatchOutcome {
            processed: 1,
            notified: 0,
            failed: 2
        }
    );
}
