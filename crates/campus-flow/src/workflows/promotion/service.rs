use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{
    PromotionChanges, PromotionEvent, PromotionStatus, PromotionType, StudentPromotion,
};
use super::repository::PromotionRepository;
use crate::workflows::school::domain::{
    AcademicLevel, InvalidTransition, LevelId, PromotionId, Student, StudentId, StudentStatus,
    UserId,
};
use crate::workflows::school::notify::{
    dispatch, Notification, NotificationKind, Notifier, Recipient,
};
use crate::workflows::school::repository::RepositoryError;

/// Grade-level promotion proposals and their approval.
pub struct PromotionService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> PromotionService<S, N>
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    pub fn propose(
        &self,
        student_id: &StudentId,
        to_level: &LevelId,
        promotion_type: PromotionType,
        promoter: &UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<StudentPromotion, PromotionError> {
        let student = self.student(student_id)?;
        if student.enrollment_status != StudentStatus::Active {
            return Err(PromotionError::InvalidPromotion(format!(
                "student is {}",
                student.enrollment_status.label()
            )));
        }
        if self.store.pending_promotion_for(student_id)?.is_some() {
            return Err(PromotionError::PendingPromotionExists);
        }

        let from = self.current_level(&student)?;
        let to = self.level(to_level)?;
        promotion_type
            .check_ordering(from.as_ref(), &to)
            .map_err(PromotionError::InvalidPromotion)?;

        let promotion = StudentPromotion {
            id: PromotionId::generate(),
            student: student.id.clone(),
            from_level: from.map(|level| level.id),
            to_level: to.id,
            promotion_type,
            status: PromotionStatus::Pending,
            promoted_by: promoter.clone(),
            approved_by: None,
            promotion_date: None,
            notes,
            rejection_reason: None,
            proposed_at: now,
        };

        let stored = self
            .store
            .insert_promotion(promotion)
            .map_err(|error| match error {
                RepositoryError::Conflict => PromotionError::PendingPromotionExists,
                other => PromotionError::Repository(other),
            })?;
        info!(
            promotion = %stored.id,
            student = %stored.student,
            promotion_type = stored.promotion_type.label(),
            "promotion proposed"
        );
        Ok(stored)
    }

    /// Move the student to the target level. Returns `false` for promotions that are no
    /// longer pending so a double-submitted approval is harmless.
    pub fn approve(
        &self,
        promotion_id: &PromotionId,
        approver: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, PromotionError> {
        let promotion = self.fetch(promotion_id)?;
        let status = match promotion
            .status
            .apply(PromotionEvent::Approve)
            .and_then(|approved| approved.apply(PromotionEvent::Apply))
        {
            Ok(status) => status,
            Err(_) => {
                info!(promotion = %promotion.id, status = promotion.status.label(), "promotion already processed");
                return Ok(false);
            }
        };

        let student = self.student(&promotion.student)?;
        let promoted_student = Student {
            current_level: Some(promotion.to_level.clone()),
            ..student
        };
        let completed = StudentPromotion {
            status,
            approved_by: Some(approver.clone()),
            promotion_date: Some(now),
            ..promotion
        };

        if !self.store.apply_promotion(&completed, &promoted_student)? {
            warn!(promotion = %completed.id, "promotion changed during approval");
            return Ok(false);
        }

        info!(promotion = %completed.id, approver = %approver, "promotion applied");
        let level_name = self
            .store
            .level(&completed.to_level)?
            .map(|level| level.name)
            .unwrap_or_else(|| completed.to_level.to_string());
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Student(completed.student.clone()),
                NotificationKind::PromotionApproved,
            )
            .with("promotion_id", &completed.id)
            .with("new_level", level_name),
        );

        Ok(true)
    }

    pub fn reject(
        &self,
        promotion_id: &PromotionId,
        approver: &UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<StudentPromotion, PromotionError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PromotionError::ReasonRequired);
        }

        let promotion = self.fetch(promotion_id)?;
        let rejected = StudentPromotion {
            status: promotion.status.apply(PromotionEvent::Reject)?,
            approved_by: Some(approver.clone()),
            promotion_date: Some(now),
            rejection_reason: Some(reason.to_string()),
            ..promotion
        };
        self.write_pending(&rejected, PromotionEvent::Reject.label())?;

        info!(promotion = %rejected.id, approver = %approver, "promotion rejected");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Student(rejected.student.clone()),
                NotificationKind::PromotionRejected,
            )
            .with("promotion_id", &rejected.id)
            .with("reason", reason),
        );

        Ok(rejected)
    }

    /// Change a pending promotion; the ordering rules are checked again against the
    /// student's current level.
    pub fn edit(
        &self,
        promotion_id: &PromotionId,
        changes: PromotionChanges,
    ) -> Result<StudentPromotion, PromotionError> {
        let promotion = self.fetch(promotion_id)?;
        Self::ensure_pending(&promotion, "edit")?;

        let student = self.student(&promotion.student)?;
        let from = self.current_level(&student)?;
        let to = self.level(changes.to_level.as_ref().unwrap_or(&promotion.to_level))?;
        let promotion_type = changes.promotion_type.unwrap_or(promotion.promotion_type);
        promotion_type
            .check_ordering(from.as_ref(), &to)
            .map_err(PromotionError::InvalidPromotion)?;

        let edited = StudentPromotion {
            from_level: from.map(|level| level.id),
            to_level: to.id,
            promotion_type,
            notes: changes.notes.or(promotion.notes.clone()),
            ..promotion
        };
        self.write_pending(&edited, "edit")?;
        Ok(edited)
    }

    pub fn delete(&self, promotion_id: &PromotionId) -> Result<(), PromotionError> {
        let promotion = self.fetch(promotion_id)?;
        Self::ensure_pending(&promotion, "delete")?;

        if !self.store.delete_pending_promotion(promotion_id)? {
            return Err(PromotionError::InvalidState(InvalidTransition {
                from: "processed",
                event: "delete",
            }));
        }
        info!(promotion = %promotion_id, "pending promotion deleted");
        Ok(())
    }

    pub fn get(&self, promotion_id: &PromotionId) -> Result<StudentPromotion, PromotionError> {
        self.fetch(promotion_id)
    }

    pub fn history(&self, student: &StudentId) -> Result<Vec<StudentPromotion>, PromotionError> {
        Ok(self.store.promotions_for_student(student)?)
    }

    fn ensure_pending(
        promotion: &StudentPromotion,
        event: &'static str,
    ) -> Result<(), PromotionError> {
        if promotion.status == PromotionStatus::Pending {
            Ok(())
        } else {
            Err(PromotionError::InvalidState(InvalidTransition {
                from: promotion.status.label(),
                event,
            }))
        }
    }

    fn write_pending(
        &self,
        updated: &StudentPromotion,
        event: &'static str,
    ) -> Result<(), PromotionError> {
        if self.store.update_pending_promotion(updated)? {
            Ok(())
        } else {
            Err(PromotionError::InvalidState(InvalidTransition {
                from: "processed",
                event,
            }))
        }
    }

    fn current_level(&self, student: &Student) -> Result<Option<AcademicLevel>, PromotionError> {
        match &student.current_level {
            Some(level) => Ok(Some(self.level(level)?)),
            None => Ok(None),
        }
    }

    fn level(&self, id: &LevelId) -> Result<AcademicLevel, PromotionError> {
        self.store
            .level(id)?
            .ok_or_else(|| PromotionError::UnknownLevel(id.clone()))
    }

    fn student(&self, id: &StudentId) -> Result<Student, PromotionError> {
        self.store
            .student(id)?
            .ok_or_else(|| PromotionError::UnknownStudent(id.clone()))
    }

    fn fetch(&self, id: &PromotionId) -> Result<StudentPromotion, PromotionError> {
        self.store
            .fetch_promotion(id)?
            .ok_or(PromotionError::Repository(RepositoryError::NotFound))
    }
}

/// Error raised by the promotion workflow.
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error("student {0} not found")]
    UnknownStudent(StudentId),
    #[error("academic level {0} not found")]
    UnknownLevel(LevelId),
    #[error("invalid promotion: {0}")]
    InvalidPromotion(String),
    #[error("student already has a pending promotion")]
    PendingPromotionExists,
    #[error("a rejection reason is required")]
    ReasonRequired,
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
