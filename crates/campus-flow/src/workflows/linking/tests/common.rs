use std::sync::Arc;

use crate::workflows::linking::{AccountLinkingService, LinkRequestDetails};
use crate::workflows::school::domain::{LinkPermissions, Relationship};
use crate::workflows::school::fixtures::seeded_store;
use crate::workflows::school::{InMemorySchoolStore, RecordingNotifier};

pub(super) type Service = AccountLinkingService<InMemorySchoolStore, RecordingNotifier>;

pub(super) fn build_service() -> (Arc<Service>, InMemorySchoolStore, RecordingNotifier) {
    let store = seeded_store();
    let notifier = RecordingNotifier::new();
    let service = Arc::new(AccountLinkingService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
    ));
    (service, store, notifier)
}

pub(super) fn details() -> LinkRequestDetails {
    LinkRequestDetails {
        relationship: Relationship::Father,
        permissions: LinkPermissions {
            is_primary_contact: false,
            can_view_grades: true,
            can_view_attendance: false,
        },
        parent_message: Some("Ben is my son".to_string()),
    }
}
