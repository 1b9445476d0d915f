use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::workflows::payments::{
    Payer, PaymentMethod, PaymentSubmission, PaymentVerificationService,
};
use crate::workflows::school::domain::{CourseId, StudentId};
use crate::workflows::school::fixtures::{date, money, seeded_store, MATH};
use crate::workflows::school::{InMemorySchoolStore, RecordingNotifier};

pub(super) type Service = PaymentVerificationService<InMemorySchoolStore, RecordingNotifier>;

pub(super) fn build_service() -> (Arc<Service>, InMemorySchoolStore, RecordingNotifier) {
    let store = seeded_store();
    let notifier = RecordingNotifier::new();
    let service = Arc::new(PaymentVerificationService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        &WorkflowConfig::default(),
    ));
    (service, store, notifier)
}

pub(super) fn submission(payer: Payer, student: &str) -> PaymentSubmission {
    PaymentSubmission {
        payer,
        student: StudentId::from(student),
        course: CourseId::from(MATH),
        amount: money(15000),
        currency: None,
        payment_date: date(2025, 3, 1),
        method: PaymentMethod::BankTransfer,
        receipt_ref: "receipts/2025/03/0001.pdf".to_string(),
        payer_notes: None,
    }
}
