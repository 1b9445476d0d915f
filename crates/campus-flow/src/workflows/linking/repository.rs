use serde::Serialize;

use super::domain::ChildLinkingRequest;
use crate::workflows::school::domain::{LinkRequestId, ParentId, ParentStudentLink, StudentId};
use crate::workflows::school::repository::{RepositoryError, SchoolDirectory};

/// Storage for linking requests. Writes that change status are compare-and-set against
/// `Pending` so two reviewers acting at once cannot both win.
pub trait LinkingRepository: SchoolDirectory {
    /// Fails with `Conflict` when a pending request already exists for the pair.
    fn insert_link_request(
        &self,
        request: ChildLinkingRequest,
    ) -> Result<ChildLinkingRequest, RepositoryError>;
    fn fetch_link_request(
        &self,
        id: &LinkRequestId,
    ) -> Result<Option<ChildLinkingRequest>, RepositoryError>;
    fn pending_link_request(
        &self,
        parent: &ParentId,
        student: &StudentId,
    ) -> Result<Option<ChildLinkingRequest>, RepositoryError>;
    fn pending_link_requests(&self) -> Result<Vec<ChildLinkingRequest>, RepositoryError>;
    /// Persists a reviewed request together with the link it grants, atomically. Returns
    /// `false` without writing when the stored request is no longer pending or, for grants,
    /// when the pair is already linked.
    fn record_link_review(
        &self,
        reviewed: &ChildLinkingRequest,
        grant: Option<ParentStudentLink>,
    ) -> Result<bool, RepositoryError>;
}

/// Sanitized representation of a request for reviewers and parents.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRequestView {
    pub request_id: LinkRequestId,
    pub parent: ParentId,
    pub student: StudentId,
    pub status: &'static str,
    pub relationship: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl From<&ChildLinkingRequest> for LinkRequestView {
    fn from(request: &ChildLinkingRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            parent: request.parent.clone(),
            student: request.student.clone(),
            status: request.status.label(),
            relationship: request.relationship.label(),
            admin_notes: request.admin_notes.clone(),
        }
    }
}
