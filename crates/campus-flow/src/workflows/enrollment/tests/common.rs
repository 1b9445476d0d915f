use std::sync::Arc;

use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{EnrollmentService, ParentInfo};
use crate::workflows::school::domain::Relationship;
use crate::workflows::school::fixtures::seeded_store;
use crate::workflows::school::{InMemorySchoolStore, RecordingNotifier};

pub(super) type Service = EnrollmentService<InMemorySchoolStore, RecordingNotifier>;

pub(super) fn build_service() -> (Arc<Service>, InMemorySchoolStore, RecordingNotifier) {
    build_with_notifier(RecordingNotifier::new())
}

pub(super) fn build_with_notifier(
    notifier: RecordingNotifier,
) -> (Arc<Service>, InMemorySchoolStore, RecordingNotifier) {
    let store = seeded_store();
    let service = Arc::new(EnrollmentService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        &WorkflowConfig::default(),
    ));
    (service, store, notifier)
}

pub(super) fn parent_info(email: &str) -> ParentInfo {
    ParentInfo {
        name: "Fay Okafor".to_string(),
        email: email.to_string(),
        phone: Some("+1 555 0100".to_string()),
        relationship: Relationship::Mother,
    }
}
