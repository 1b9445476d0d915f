use super::common::*;

use crate::workflows::reporting::ReportingError;
use crate::workflows::school::domain::{LinkPermissions, ParentId, StudentId};
use crate::workflows::school::fixtures::{
    link, ADULT, FREE_PARENT, LINKED_MINOR, LINKED_PARENT,
};

#[test]
fn student_progress_combines_enrollments_and_attendance() {
    let (reporter, store) = build_reporter();
    seed_coursework(&store);

    let progress = reporter
        .student_progress(&StudentId::from(LINKED_MINOR))
        .expect("progress");
    assert_eq!(progress.overall_progress, 70.0);
    assert_eq!(progress.attendance_rate, 66.7);
}

#[test]
fn student_without_history_reports_zero() {
    let (reporter, _) = build_reporter();
    let progress = reporter
        .student_progress(&StudentId::from(ADULT))
        .expect("progress");
    assert_eq!(progress.overall_progress, 0.0);
    assert_eq!(progress.attendance_rate, 0.0);

    assert!(matches!(
        reporter.calculate_overall_progress(&StudentId::from("stu-nobody")),
        Err(ReportingError::UnknownStudent(_))
    ));
}

#[test]
fn linked_parent_sees_grades_and_attendance() {
    let (reporter, store) = build_reporter();
    seed_coursework(&store);

    let children = reporter
        .get_children_progress(&ParentId::from(LINKED_PARENT))
        .expect("children");
    assert_eq!(children.len(), 1);

    let cara = &children[0];
    assert_eq!(cara.name, "Cara");
    assert_eq!(cara.relationship, "mother");
    assert_eq!(cara.current_level.as_deref(), Some("Grade 4"));
    assert_eq!(cara.overall_progress, 70.0);
    assert_eq!(cara.attendance_rate, Some(66.7));

    let enrollments = cara.enrollments.as_ref().expect("grades visible");
    assert_eq!(enrollments.len(), 2);
    assert!(enrollments
        .iter()
        .any(|summary| summary.course_title == "Mathematics" && summary.final_grade == Some(88.5)));
}

#[test]
fn restricted_link_hides_grades_and_attendance() {
    let (reporter, store) = build_reporter();
    seed_coursework(&store);
    store.insert_link(link(
        FREE_PARENT,
        LINKED_MINOR,
        LinkPermissions {
            is_primary_contact: false,
            can_view_grades: false,
            can_view_attendance: false,
        },
    ));

    let children = reporter
        .get_children_progress(&ParentId::from(FREE_PARENT))
        .expect("children");
    assert_eq!(children.len(), 1);
    assert!(children[0].enrollments.is_none());
    assert!(children[0].attendance_rate.is_none());
}

#[test]
fn unlinked_or_unknown_parents() {
    let (reporter, _) = build_reporter();
    assert!(reporter
        .get_children_progress(&ParentId::from(FREE_PARENT))
        .expect("children")
        .is_empty());
    assert!(matches!(
        reporter.get_children_progress(&ParentId::from("par-nobody")),
        Err(ReportingError::UnknownParent(_))
    ));
}
