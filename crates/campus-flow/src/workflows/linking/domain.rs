use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::school::domain::{
    InvalidTransition, LinkPermissions, LinkRequestId, ParentId, ParentStudentLink, Relationship,
    StudentId, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDecision {
    Approve,
    Reject,
}

impl LinkDecision {
    pub const fn label(self) -> &'static str {
        match self {
            LinkDecision::Approve => "approve",
            LinkDecision::Reject => "reject",
        }
    }
}

impl LinkRequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LinkRequestStatus::Pending => "pending",
            LinkRequestStatus::Approved => "approved",
            LinkRequestStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, LinkRequestStatus::Pending)
    }

    /// Reviewed requests are immutable; only a pending request accepts a decision.
    pub fn apply(self, decision: LinkDecision) -> Result<Self, InvalidTransition> {
        match (self, decision) {
            (LinkRequestStatus::Pending, LinkDecision::Approve) => Ok(LinkRequestStatus::Approved),
            (LinkRequestStatus::Pending, LinkDecision::Reject) => Ok(LinkRequestStatus::Rejected),
            (from, decision) => Err(InvalidTransition {
                from: from.label(),
                event: decision.label(),
            }),
        }
    }
}

/// What the parent asks for when requesting access to a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequestDetails {
    pub relationship: Relationship,
    pub permissions: LinkPermissions,
    #[serde(default)]
    pub parent_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLinkingRequest {
    pub id: LinkRequestId,
    pub parent: ParentId,
    pub student: StudentId,
    pub relationship: Relationship,
    pub permissions: LinkPermissions,
    pub parent_message: Option<String>,
    pub status: LinkRequestStatus,
    pub reviewer: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl ChildLinkingRequest {
    /// The link an approval of this request creates.
    pub fn to_link(&self, linked_at: DateTime<Utc>) -> ParentStudentLink {
        ParentStudentLink {
            parent: self.parent.clone(),
            student: self.student.clone(),
            relationship: self.relationship,
            permissions: self.permissions,
            linked_at,
        }
    }
}
