//! Payment receipts, admin verification, and the course subscriptions they fund.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Payer, Payment, PaymentDecision, PaymentMethod, PaymentStatus, PaymentSubmission,
    Subscription, SubscriptionStatus,
};
pub use repository::{PaymentRepository, PaymentView, SubscriptionView};
pub use router::payment_router;
pub use service::{ExpirySweep, PaymentError, PaymentVerificationService};
