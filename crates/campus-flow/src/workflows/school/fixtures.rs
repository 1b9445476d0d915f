//! Seeded school used by the workflow test suites.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use super::domain::{
    AcademicLevel, ContactPreferences, Course, CourseId, FrequencyPricing, LevelId,
    LinkPermissions, ParentAccount, ParentId, ParentStudentLink, Relationship, Student, StudentId,
    StudentStatus, UserId,
};
use super::memory::InMemorySchoolStore;

pub(crate) const ADULT: &str = "stu-ada";
pub(crate) const MINOR: &str = "stu-ben";
pub(crate) const LINKED_MINOR: &str = "stu-cara";
pub(crate) const LINKED_PARENT: &str = "par-dana";
pub(crate) const FREE_PARENT: &str = "par-eli";
pub(crate) const MATH: &str = "crs-math";
pub(crate) const ART: &str = "crs-art";
pub(crate) const PIANO: &str = "crs-piano";
pub(crate) const INSTRUCTOR: &str = "usr-instructor";
pub(crate) const ADMIN: &str = "usr-admin";

/// Monday 2025-03-03, 10:00 UTC.
pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap()
}

pub(crate) fn today() -> NaiveDate {
    now().date_naive()
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(crate) fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub(crate) fn admin() -> UserId {
    UserId::from(ADMIN)
}

pub(crate) fn student(id: &str, name: &str, born: NaiveDate, level: Option<&str>) -> Student {
    Student {
        id: StudentId::from(id),
        user: UserId(format!("usr-{id}")),
        name: name.to_string(),
        email: format!("{}@students.example.test", name.to_ascii_lowercase()),
        date_of_birth: born,
        enrollment_status: StudentStatus::Active,
        current_level: level.map(LevelId::from),
    }
}

pub(crate) fn level(number: u8) -> AcademicLevel {
    AcademicLevel {
        id: LevelId(format!("lvl-{number}")),
        name: format!("Grade {number}"),
        grade_number: number,
    }
}

pub(crate) fn course(id: &str, title: &str, pricing: FrequencyPricing, active: bool) -> Course {
    Course {
        id: CourseId::from(id),
        title: title.to_string(),
        instructor: UserId::from(INSTRUCTOR),
        is_active: active,
        pricing,
        currency: "USD".to_string(),
        subscription_duration_weeks: 4,
    }
}

pub(crate) fn parent(id: &str, name: &str, email: &str) -> ParentAccount {
    ParentAccount {
        id: ParentId::from(id),
        user: UserId(format!("usr-{id}")),
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        preferences: ContactPreferences::default(),
    }
}

pub(crate) fn link(parent: &str, student: &str, permissions: LinkPermissions) -> ParentStudentLink {
    ParentStudentLink {
        parent: ParentId::from(parent),
        student: StudentId::from(student),
        relationship: Relationship::Mother,
        permissions,
        linked_at: now(),
    }
}

/// Two unlinked students (adult Ada, minor Ben), a minor (Cara) linked to Dana, an
/// unlinked parent (Eli), grades 4 to 7, and three courses.
pub(crate) fn seeded_store() -> InMemorySchoolStore {
    let store = InMemorySchoolStore::new();
    for number in 4..=7 {
        store.insert_level(level(number));
    }

    store.insert_student(student(ADULT, "Ada", date(2005, 1, 10), Some("lvl-5")));
    store.insert_student(student(MINOR, "Ben", date(2010, 1, 10), Some("lvl-5")));
    store.insert_student(student(LINKED_MINOR, "Cara", date(2012, 6, 1), Some("lvl-4")));

    store.insert_parent(parent(LINKED_PARENT, "Dana", "dana@example.test"));
    store.insert_parent(parent(FREE_PARENT, "Eli", "eli@example.test"));
    store.insert_link(link(LINKED_PARENT, LINKED_MINOR, LinkPermissions::full()));

    store.insert_course(course(
        MATH,
        "Mathematics",
        FrequencyPricing {
            price_1x_weekly: Some(money(6000)),
            price_2x_weekly: Some(money(10000)),
            price_3x_weekly: Some(money(15000)),
        },
        true,
    ));
    store.insert_course(course(
        ART,
        "Art History",
        FrequencyPricing {
            price_1x_weekly: Some(money(4000)),
            ..FrequencyPricing::default()
        },
        false,
    ));
    store.insert_course(course(
        PIANO,
        "Piano",
        FrequencyPricing {
            price_1x_weekly: Some(money(8000)),
            ..FrequencyPricing::default()
        },
        true,
    ));
    store
}
