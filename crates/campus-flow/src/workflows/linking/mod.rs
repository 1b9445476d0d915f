//! Parent-to-student account linking: request, admin review, idempotent grant.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ChildLinkingRequest, LinkDecision, LinkRequestDetails, LinkRequestStatus};
pub use repository::{LinkRequestView, LinkingRepository};
pub use router::linking_router;
pub use service::{AccountLinkingService, LinkingError};
