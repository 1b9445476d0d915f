use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::school::domain::{
    AcademicLevel, InvalidTransition, LevelId, PromotionId, StudentId, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    Regular,
    Skip,
    Repeat,
    Transfer,
    Manual,
}

impl PromotionType {
    pub const fn label(self) -> &'static str {
        match self {
            PromotionType::Regular => "regular",
            PromotionType::Skip => "skip",
            PromotionType::Repeat => "repeat",
            PromotionType::Transfer => "transfer",
            PromotionType::Manual => "manual",
        }
    }

    /// Check the grade ordering this promotion type demands. Regular and skip promotions move
    /// strictly upward, repeats stay on the same grade, transfers and manual placements may
    /// land anywhere. A student without a level can be placed by any type.
    pub fn check_ordering(
        self,
        from: Option<&AcademicLevel>,
        to: &AcademicLevel,
    ) -> Result<(), String> {
        let Some(from) = from else {
            return Ok(());
        };

        match self {
            PromotionType::Regular | PromotionType::Skip if to.grade_number <= from.grade_number => {
                Err(format!(
                    "{} promotion must move above grade {} (target is grade {})",
                    self.label(),
                    from.grade_number,
                    to.grade_number
                ))
            }
            PromotionType::Repeat if to.grade_number != from.grade_number => Err(format!(
                "repeat promotion must stay on grade {} (target is grade {})",
                from.grade_number, to.grade_number
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionEvent {
    Approve,
    /// Level change written to the student.
    Apply,
    Reject,
}

impl PromotionEvent {
    pub const fn label(self) -> &'static str {
        match self {
            PromotionEvent::Approve => "approve",
            PromotionEvent::Apply => "apply",
            PromotionEvent::Reject => "reject",
        }
    }
}

impl PromotionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PromotionStatus::Pending => "pending",
            PromotionStatus::Approved => "approved",
            PromotionStatus::Completed => "completed",
            PromotionStatus::Rejected => "rejected",
        }
    }

    pub fn apply(self, event: PromotionEvent) -> Result<Self, InvalidTransition> {
        match (self, event) {
            (PromotionStatus::Pending, PromotionEvent::Approve) => Ok(PromotionStatus::Approved),
            (PromotionStatus::Approved, PromotionEvent::Apply) => Ok(PromotionStatus::Completed),
            (PromotionStatus::Pending, PromotionEvent::Reject) => Ok(PromotionStatus::Rejected),
            (from, event) => Err(InvalidTransition {
                from: from.label(),
                event: event.label(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPromotion {
    pub id: PromotionId,
    pub student: StudentId,
    pub from_level: Option<LevelId>,
    pub to_level: LevelId,
    pub promotion_type: PromotionType,
    pub status: PromotionStatus,
    pub promoted_by: UserId,
    pub approved_by: Option<UserId>,
    pub promotion_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub proposed_at: DateTime<Utc>,
}

/// Fields an admin may change while a promotion is still pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionChanges {
    #[serde(default)]
    pub to_level: Option<LevelId>,
    #[serde(default)]
    pub promotion_type: Option<PromotionType>,
    #[serde(default)]
    pub notes: Option<String>,
}
