use std::sync::Arc;

use crate::workflows::promotion::PromotionService;
use crate::workflows::school::domain::UserId;
use crate::workflows::school::fixtures::seeded_store;
use crate::workflows::school::{InMemorySchoolStore, RecordingNotifier};

pub(super) type Service = PromotionService<InMemorySchoolStore, RecordingNotifier>;

pub(super) fn build_service() -> (Arc<Service>, InMemorySchoolStore, RecordingNotifier) {
    let store = seeded_store();
    let notifier = RecordingNotifier::new();
    let service = Arc::new(PromotionService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
    ));
    (service, store, notifier)
}

pub(super) fn registrar() -> UserId {
    UserId::from("usr-registrar")
}
