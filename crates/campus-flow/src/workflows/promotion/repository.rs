use serde::Serialize;

use super::domain::StudentPromotion;
use crate::workflows::school::domain::{LevelId, PromotionId, Student, StudentId};
use crate::workflows::school::repository::{RepositoryError, SchoolDirectory};

/// Storage for promotions. Every mutating call only succeeds against a pending promotion.
pub trait PromotionRepository: SchoolDirectory {
    fn insert_promotion(
        &self,
        promotion: StudentPromotion,
    ) -> Result<StudentPromotion, RepositoryError>;
    fn fetch_promotion(&self, id: &PromotionId)
        -> Result<Option<StudentPromotion>, RepositoryError>;
    fn pending_promotion_for(
        &self,
        student: &StudentId,
    ) -> Result<Option<StudentPromotion>, RepositoryError>;
    fn promotions_for_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<StudentPromotion>, RepositoryError>;
    /// Replaces a pending promotion (edit or rejection).
    fn update_pending_promotion(
        &self,
        updated: &StudentPromotion,
    ) -> Result<bool, RepositoryError>;
    fn delete_pending_promotion(&self, id: &PromotionId) -> Result<bool, RepositoryError>;
    /// Writes the completed promotion and the student's new level in one step.
    fn apply_promotion(
        &self,
        completed: &StudentPromotion,
        student: &Student,
    ) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct PromotionView {
    pub promotion_id: PromotionId,
    pub student: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_level: Option<LevelId>,
    pub to_level: LevelId,
    pub promotion_type: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl From<&StudentPromotion> for PromotionView {
    fn from(promotion: &StudentPromotion) -> Self {
        Self {
            promotion_id: promotion.id.clone(),
            student: promotion.student.clone(),
            from_level: promotion.from_level.clone(),
            to_level: promotion.to_level.clone(),
            promotion_type: promotion.promotion_type.label(),
            status: promotion.status.label(),
            rejection_reason: promotion.rejection_reason.clone(),
        }
    }
}
