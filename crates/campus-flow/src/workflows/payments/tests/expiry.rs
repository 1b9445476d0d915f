use super::common::*;

use crate::workflows::payments::{
    ExpirySweep, Payer, PaymentRepository, Subscription, SubscriptionStatus,
};
use crate::workflows::school::domain::{CourseId, PaymentId, StudentId, SubscriptionId};
use crate::workflows::school::fixtures::{admin, date, now, ADULT, LINKED_MINOR, MATH, PIANO};
use crate::workflows::school::notify::NotificationKind;

fn subscription(id: &str, student: &str, course: &str, end: chrono::NaiveDate) -> Subscription {
    Subscription {
        id: SubscriptionId::from(id),
        student: StudentId::from(student),
        course: CourseId::from(course),
        status: SubscriptionStatus::Active,
        start_date: date(2025, 1, 1),
        end_date: end,
        last_warned_on: None,
        last_payment: PaymentId::from("pay-seed"),
    }
}

#[test]
fn sweep_expires_lapsed_and_warns_soon_ending_terms_once() {
    let (service, store, notifier) = build_service();
    store.insert_subscription(subscription("sub-lapsed", ADULT, MATH, date(2025, 3, 2)));
    store.insert_subscription(subscription("sub-ending", ADULT, PIANO, date(2025, 3, 7)));
    store.insert_subscription(subscription("sub-later", LINKED_MINOR, MATH, date(2025, 4, 30)));

    let today = date(2025, 3, 3);
    let first = service.check_expiry(today).expect("sweep");
    assert_eq!(
        first,
        ExpirySweep {
            expired: 1,
            warned: 1,
            failed: 0
        }
    );

    let second = service.check_expiry(today).expect("second sweep");
    assert_eq!(second, ExpirySweep::default());
    let next_day = service.check_expiry(date(2025, 3, 4)).expect("next day");
    assert_eq!(next_day, ExpirySweep::default());

    let expired = store
        .subscriptions_with_status(SubscriptionStatus::Expired)
        .expect("expired");
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, SubscriptionId::from("sub-lapsed"));

    let kinds: Vec<NotificationKind> = notifier.events().iter().map(|event| event.kind).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&NotificationKind::SubscriptionExpired));
    assert!(kinds.contains(&NotificationKind::SubscriptionExpiring));
}

#[test]
fn subscription_ending_today_is_warned_not_expired() {
    let (service, store, _) = build_service();
    store.insert_subscription(subscription("sub-today", ADULT, MATH, date(2025, 3, 3)));

    let sweep = service.check_expiry(date(2025, 3, 3)).expect("sweep");
    assert_eq!(sweep.expired, 0);
    assert_eq!(sweep.warned, 1);

    let sweep = service.check_expiry(date(2025, 3, 4)).expect("sweep");
    assert_eq!(sweep.expired, 1);
}

#[test]
fn renewal_after_expiry_restarts_the_term() {
    let (service, store, _) = build_service();
    store.insert_subscription(subscription("sub-lapsed", ADULT, MATH, date(2025, 2, 1)));
    service.check_expiry(date(2025, 3, 3)).expect("sweep");

    let payment = service
        .submit_payment(
            submission(Payer::Student(StudentId::from(ADULT)), ADULT),
            now(),
        )
        .expect("submit");
    service
        .verify(&payment.id, &admin(), None, now())
        .expect("verify");

    let renewed = store
        .subscription_for(&StudentId::from(ADULT), &CourseId::from(MATH))
        .expect("lookup")
        .expect("subscription");
    assert_eq!(renewed.id, SubscriptionId::from("sub-lapsed"));
    assert_eq!(renewed.status, SubscriptionStatus::Active);
    assert_eq!(renewed.start_date, date(2025, 3, 1));
    assert_eq!(renewed.end_date, date(2025, 3, 29));
}
