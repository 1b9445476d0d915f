use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{ChildLinkingRequest, LinkDecision, LinkRequestDetails, LinkRequestStatus};
use super::repository::LinkingRepository;
use crate::workflows::school::domain::{
    InvalidTransition, LinkRequestId, ParentId, StudentId, UserId,
};
use crate::workflows::school::notify::{
    dispatch, Notification, NotificationKind, Notifier, Recipient,
};
use crate::workflows::school::repository::RepositoryError;

/// Parent-to-child linking: parents ask, admins decide.
pub struct AccountLinkingService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> AccountLinkingService<S, N>
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Open a pending request and alert the admin reviewers.
    pub fn request_link(
        &self,
        parent: &ParentId,
        student: &StudentId,
        details: LinkRequestDetails,
        now: DateTime<Utc>,
    ) -> Result<ChildLinkingRequest, LinkingError> {
        let parent_account = self
            .store
            .parent(parent)?
            .ok_or_else(|| LinkingError::UnknownParent(parent.clone()))?;
        let student_record = self
            .store
            .student(student)?
            .ok_or_else(|| LinkingError::UnknownStudent(student.clone()))?;

        if self.store.parent_link(parent, student)?.is_some() {
            return Err(LinkingError::DuplicateLink);
        }
        if self.store.pending_link_request(parent, student)?.is_some() {
            return Err(LinkingError::DuplicatePendingRequest);
        }

        let request = ChildLinkingRequest {
            id: LinkRequestId::generate(),
            parent: parent.clone(),
            student: student.clone(),
            relationship: details.relationship,
            permissions: details.permissions,
            parent_message: details.parent_message,
            status: LinkRequestStatus::Pending,
            reviewer: None,
            reviewed_at: None,
            admin_notes: None,
            requested_at: now,
        };

        let stored = self
            .store
            .insert_link_request(request)
            .map_err(|error| match error {
                RepositoryError::Conflict => LinkingError::DuplicatePendingRequest,
                other => LinkingError::Repository(other),
            })?;

        info!(request = %stored.id, parent = %parent, student = %student, "link request opened");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(Recipient::AdminReviewers, NotificationKind::LinkRequested)
                .with("request_id", &stored.id)
                .with("parent_name", &parent_account.name)
                .with("student_name", &student_record.name)
                .with("relationship", stored.relationship.label()),
        );

        Ok(stored)
    }

    /// Grant the link. Returns `false` when the pair is already linked or the request was
    /// already reviewed, leaving everything as it was.
    pub fn approve(
        &self,
        request_id: &LinkRequestId,
        reviewer: &UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, LinkingError> {
        let request = self.fetch(request_id)?;

        if self
            .store
            .parent_link(&request.parent, &request.student)?
            .is_some()
        {
            info!(request = %request.id, "link already exists; approval skipped");
            return Ok(false);
        }

        let status = match request.status.apply(LinkDecision::Approve) {
            Ok(status) => status,
            Err(_) => return Ok(false),
        };

        let reviewed = ChildLinkingRequest {
            status,
            reviewer: Some(reviewer.clone()),
            reviewed_at: Some(now),
            admin_notes: notes,
            ..request
        };
        let link = reviewed.to_link(now);

        if !self.store.record_link_review(&reviewed, Some(link))? {
            warn!(request = %reviewed.id, "link request changed during approval");
            return Ok(false);
        }

        info!(request = %reviewed.id, reviewer = %reviewer, "link request approved");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Parent(reviewed.parent.clone()),
                NotificationKind::LinkApproved,
            )
            .with("request_id", &reviewed.id)
            .with("student_id", &reviewed.student),
        );

        Ok(true)
    }

    pub fn reject(
        &self,
        request_id: &LinkRequestId,
        reviewer: &UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<ChildLinkingRequest, LinkingError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LinkingError::ReasonRequired);
        }

        let request = self.fetch(request_id)?;
        let status = request.status.apply(LinkDecision::Reject)?;

        let reviewed = ChildLinkingRequest {
            status,
            reviewer: Some(reviewer.clone()),
            reviewed_at: Some(now),
            admin_notes: Some(reason.to_string()),
            ..request
        };

        if !self.store.record_link_review(&reviewed, None)? {
            return Err(LinkingError::InvalidState(InvalidTransition {
                from: "reviewed",
                event: LinkDecision::Reject.label(),
            }));
        }

        info!(request = %reviewed.id, reviewer = %reviewer, "link request rejected");
        dispatch(
            self.notifier.as_ref(),
            Notification::new(
                Recipient::Parent(reviewed.parent.clone()),
                NotificationKind::LinkRejected,
            )
            .with("request_id", &reviewed.id)
            .with("reason", reason),
        );

        Ok(reviewed)
    }

    pub fn get(&self, request_id: &LinkRequestId) -> Result<ChildLinkingRequest, LinkingError> {
        self.fetch(request_id)
    }

    pub fn pending(&self) -> Result<Vec<ChildLinkingRequest>, LinkingError> {
        Ok(self.store.pending_link_requests()?)
    }

    fn fetch(&self, request_id: &LinkRequestId) -> Result<ChildLinkingRequest, LinkingError> {
        self.store
            .fetch_link_request(request_id)?
            .ok_or(LinkingError::Repository(RepositoryError::NotFound))
    }
}

/// Error raised by the linking workflow.
#[derive(Debug, thiserror::Error)]
pub enum LinkingError {
    #[error("parent {0} not found")]
    UnknownParent(ParentId),
    #[error("student {0} not found")]
    UnknownStudent(StudentId),
    #[error("parent is already linked to this student")]
    DuplicateLink,
    #[error("a pending link request already exists for this parent and student")]
    DuplicatePendingRequest,
    #[error("a rejection reason is required")]
    ReasonRequired,
    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
