use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Login identity for staff (admins, instructors) and account owners.
    UserId,
    "usr"
);
record_id!(StudentId, "stu");
record_id!(ParentId, "par");
record_id!(LevelId, "lvl");
record_id!(CourseId, "crs");
record_id!(LinkRequestId, "lnk");
record_id!(EnrollmentRequestId, "req");
record_id!(EnrollmentId, "enr");
record_id!(PromotionId, "pro");
record_id!(PaymentId, "pay");
record_id!(SubscriptionId, "sub");
record_id!(SessionId, "ses");
record_id!(AssignmentId, "asg");

/// Raised when a status enum is asked to apply an event its transition table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {event} a {from} record")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub event: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    Graduated,
    Dropped,
    Suspended,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Graduated => "graduated",
            StudentStatus::Dropped => "dropped",
            StudentStatus::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub user: UserId,
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub enrollment_status: StudentStatus,
    pub current_level: Option<LevelId>,
}

impl Student {
    /// Age in completed years on `today`; zero for birth dates in the future.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }

    pub fn is_minor(&self, today: NaiveDate, age_of_majority: u32) -> bool {
        self.age_on(today) < age_of_majority
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicLevel {
    pub id: LevelId,
    pub name: String,
    pub grade_number: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Email,
    Sms,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPreferences {
    pub preferred_channel: ContactChannel,
    pub weekly_reports: bool,
}

impl Default for ContactPreferences {
    fn default() -> Self {
        Self {
            preferred_channel: ContactChannel::Email,
            weekly_reports: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentAccount {
    pub id: ParentId,
    pub user: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferences: ContactPreferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Mother,
    Father,
    Guardian,
    Grandparent,
    Other,
}

impl Relationship {
    pub const fn label(self) -> &'static str {
        match self {
            Relationship::Mother => "mother",
            Relationship::Father => "father",
            Relationship::Guardian => "guardian",
            Relationship::Grandparent => "grandparent",
            Relationship::Other => "other",
        }
    }
}

/// Per-link flags controlling what a parent sees about a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPermissions {
    pub is_primary_contact: bool,
    pub can_view_grades: bool,
    pub can_view_attendance: bool,
}

impl LinkPermissions {
    pub const fn full() -> Self {
        Self {
            is_primary_contact: true,
            can_view_grades: true,
            can_view_attendance: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentStudentLink {
    pub parent: ParentId,
    pub student: StudentId,
    pub relationship: Relationship,
    pub permissions: LinkPermissions,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "1x_weekly")]
    OnceWeekly,
    #[serde(rename = "2x_weekly")]
    TwiceWeekly,
    #[serde(rename = "3x_weekly")]
    ThriceWeekly,
}

impl Frequency {
    pub const fn label(self) -> &'static str {
        match self {
            Frequency::OnceWeekly => "1x_weekly",
            Frequency::TwiceWeekly => "2x_weekly",
            Frequency::ThriceWeekly => "3x_weekly",
        }
    }
}

/// Price per subscription period, keyed by weekly session frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyPricing {
    pub price_1x_weekly: Option<Decimal>,
    pub price_2x_weekly: Option<Decimal>,
    pub price_3x_weekly: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub instructor: UserId,
    pub is_active: bool,
    pub pricing: FrequencyPricing,
    pub currency: String,
    pub subscription_duration_weeks: u32,
}

impl Course {
    pub fn price_for(&self, frequency: Frequency) -> Option<Decimal> {
        match frequency {
            Frequency::OnceWeekly => self.pricing.price_1x_weekly,
            Frequency::TwiceWeekly => self.pricing.price_2x_weekly,
            Frequency::ThriceWeekly => self.pricing.price_3x_weekly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(born: NaiveDate) -> Student {
        Student {
            id: StudentId::from("stu-1"),
            user: UserId::from("usr-1"),
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            date_of_birth: born,
            enrollment_status: StudentStatus::Active,
            current_level: None,
        }
    }

    #[test]
    fn age_counts_completed_years_only() {
        let learner = student(NaiveDate::from_ymd_opt(2008, 6, 15).expect("valid"));
        let day_before = NaiveDate::from_ymd_opt(2026, 6, 14).expect("valid");
        let birthday = NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid");

        assert_eq!(learner.age_on(day_before), 17);
        assert!(learner.is_minor(day_before, 18));
        assert_eq!(learner.age_on(birthday), 18);
        assert!(!learner.is_minor(birthday, 18));
    }

    #[test]
    fn generated_ids_carry_their_prefix() {
        let id = PaymentId::generate();
        assert!(id.as_str().starts_with("pay-"));
        assert_ne!(id, PaymentId::generate());
    }

    #[test]
    fn frequency_labels_match_wire_names() {
        let encoded = serde_json::to_string(&Frequency::ThriceWeekly).expect("serializes");
        assert_eq!(encoded, format!("\"{}\"", Frequency::ThriceWeekly.label()));
    }
}
