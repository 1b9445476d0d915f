//! Student grade-level promotions: proposal, review, and the level change itself.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{PromotionChanges, PromotionEvent, PromotionStatus, PromotionType, StudentPromotion};
pub use repository::{PromotionRepository, PromotionView};
pub use router::promotion_router;
pub use service::{PromotionError, PromotionService};
