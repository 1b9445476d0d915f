use super::common::*;

use crate::config::WorkflowConfig;
use crate::workflows::enrollment::{EnrollmentRequestStatus, EnrollmentService};
use crate::workflows::payments::{
    Payer, PaymentError, PaymentRepository, PaymentStatus, SubscriptionStatus,
};
use crate::workflows::school::domain::{CourseId, Frequency, ParentId, StudentId};
use crate::workflows::school::fixtures::{
    admin, date, money, now, ADULT, FREE_PARENT, LINKED_MINOR, LINKED_PARENT, MATH, MINOR,
};
use crate::workflows::school::notify::{NotificationKind, Recipient};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn submission_validates_payer_amount_and_receipt() {
    let (service, _, _) = build_service();

    assert!(matches!(
        service.submit_payment(
            submission(Payer::Student(StudentId::from(MINOR)), ADULT),
            now()
        ),
        Err(PaymentError::PayerMismatch)
    ));
    assert!(matches!(
        service.submit_payment(
            submission(Payer::Parent(ParentId::from(FREE_PARENT)), LINKED_MINOR),
            now()
        ),
        Err(PaymentError::PayerMismatch)
    ));

    let mut free = submission(Payer::Student(StudentId::from(ADULT)), ADULT);
    free.amount = money(0);
    assert!(matches!(
        service.submit_payment(free, now()),
        Err(PaymentError::InvalidAmount(_))
    ));

    let mut unreceipted = submission(Payer::Student(StudentId::from(ADULT)), ADULT);
    unreceipted.receipt_ref = "  ".to_string();
    assert!(matches!(
        service.submit_payment(unreceipted, now()),
        Err(PaymentError::MissingReceipt)
    ));
}

#[test]
fn linked_parent_payment_waits_for_review() {
    let (service, _, notifier) = build_service();

    let payment = service
        .submit_payment(
            submission(Payer::Parent(ParentId::from(LINKED_PARENT)), LINKED_MINOR),
            now(),
        )
        .expect("parent payment");

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.currency, "USD");
    assert_eq!(service.pending().expect("pending").len(), 1);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, Recipient::AdminReviewers);
    assert_eq!(events[0].kind, NotificationKind::PaymentSubmitted);
}

#[test]
fn verification_opens_a_subscription_for_the_course_duration() {
    let (service, store, notifier) = build_service();
    let payment = service
        .submit_payment(submission(Payer::Student(StudentId::from(ADULT)), ADULT), now())
        .expect("submit");

    let verified = service
        .verify(&payment.id, &admin(), Some("matched bank statement".into()), now())
        .expect("verify");
    assert_eq!(verified.status, PaymentStatus::Verified);
    assert_eq!(verified.verifier, Some(admin()));

    let subscription = store
        .subscription_for(&StudentId::from(ADULT), &CourseId::from(MATH))
        .expect("lookup")
        .expect("subscription");
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.start_date, date(2025, 3, 1));
    assert_eq!(subscription.end_date, date(2025, 3, 29));
    assert_eq!(subscription.last_payment, payment.id);

    let last = notifier.events().pop().expect("payer notice");
    assert_eq!(last.kind, NotificationKind::PaymentVerified);
    assert_eq!(last.recipient, Recipient::Student(StudentId::from(ADULT)));
}

#[test]
fn second_payment_extends_the_active_term() {
    let (service, store, _) = build_service();
    for _ in 0..2 {
        let payment = service
            .submit_payment(submission(Payer::Student(StudentId::from(ADULT)), ADULT), now())
            .expect("submit");
        service
            .verify(&payment.id, &admin(), None, now())
            .expect("verify");
    }

    let subscriptions = store
        .subscriptions_for_student(&StudentId::from(ADULT))
        .expect("subscriptions");
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].end_date, date(2025, 4, 26));
}

#[test]
fn reviewed_payments_cannot_be_reviewed_again() {
    let (service, store, _) = build_service();
    let payment = service
        .submit_payment(submission(Payer::Student(StudentId::from(ADULT)), ADULT), now())
        .expect("submit");

    let rejected = service
        .reject(&payment.id, &admin(), "receipt is illegible", now())
        .expect("reject");
    assert_eq!(rejected.status, PaymentStatus::Rejected);
    assert_eq!(rejected.admin_notes.as_deref(), Some("receipt is illegible"));
    assert!(store
        .subscription_for(&StudentId::from(ADULT), &CourseId::from(MATH))
        .expect("lookup")
        .is_none());

    assert!(matches!(
        service.verify(&payment.id, &admin(), None, now()),
        Err(PaymentError::InvalidState(_))
    ));
    assert!(matches!(
        service.reject(&payment.id, &admin(), "again", now()),
        Err(PaymentError::InvalidState(_))
    ));
}

#[test]
fn rejection_leaves_existing_subscription_untouched() {
    let (service, store, _) = build_service();
    let first = service
        .submit_payment(submission(Payer::Student(StudentId::from(ADULT)), ADULT), now())
        .expect("submit");
    service.verify(&first.id, &admin(), None, now()).expect("verify");
    let before = store
        .subscription_for(&StudentId::from(ADULT), &CourseId::from(MATH))
        .expect("lookup");

    let second = service
        .submit_payment(submission(Payer::Student(StudentId::from(ADULT)), ADULT), now())
        .expect("submit");
    service
        .reject(&second.id, &admin(), "duplicate receipt", now())
        .expect("reject");

    let after = store
        .subscription_for(&StudentId::from(ADULT), &CourseId::from(MATH))
        .expect("lookup");
    assert_eq!(before, after);
}

#[test]
fn verification_unblocks_parent_notified_enrollment() {
    let (service, store, notifier) = build_service();
    let enrollments = EnrollmentService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        &WorkflowConfig::default(),
    );
    let student = StudentId::from(LINKED_MINOR);
    let request = enrollments
        .submit_request(&student, &CourseId::from(MATH), Frequency::ThriceWeekly, None, now())
        .expect("request");
    assert_eq!(request.status, EnrollmentRequestStatus::ParentNotified);

    let payment = service
        .submit_payment(
            submission(Payer::Parent(ParentId::from(LINKED_PARENT)), LINKED_MINOR),
            now(),
        )
        .expect("submit");
    service.verify(&payment.id, &admin(), None, now()).expect("verify");

    let paid = enrollments.get_request(&request.id).expect("request");
    assert_eq!(paid.status, EnrollmentRequestStatus::ParentNotified);
    assert_eq!(paid.verified_payment, Some(payment.id.clone()));

    let enrollment = enrollments
        .approve(&request.id, &admin(), now())
        .expect("approvable once paid");
    assert_eq!(enrollment.student, student);

    let verified_notice = notifier
        .events()
        .into_iter()
        .find(|event| event.kind == NotificationKind::PaymentVerified)
        .expect("verified notice");
    assert_eq!(
        verified_notice.recipient,
        Recipient::Parent(ParentId::from(LINKED_PARENT))
    );
}

#[test]
fn concurrent_verifications_share_one_subscription() {
    for _ in 0..50 {
        let (service, store, _) = build_service();
        let payments: Vec<_> = (0..2)
            .map(|_| {
                service
                    .submit_payment(submission(Payer::Student(StudentId::from(ADULT)), ADULT), now())
                    .expect("submit")
            })
            .collect();

        let barrier = Barrier::new(payments.len());
        thread::scope(|scope| {
            for payment in &payments {
                let service = &service;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    service
                        .verify(&payment.id, &admin(), None, now())
                        .expect("verify");
                });
            }
        });

        let subscriptions = store
            .subscriptions_for_student(&StudentId::from(ADULT))
            .expect("subscriptions");
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].end_date, date(2025, 4, 26));
    }
}
