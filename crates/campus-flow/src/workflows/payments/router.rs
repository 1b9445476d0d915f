use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;

use super::domain::{Payment, PaymentSubmission};
use super::repository::{PaymentRepository, PaymentView, SubscriptionView};
use super::service::{PaymentError, PaymentVerificationService};
use crate::workflows::enrollment::EnrollmentRepository;
use crate::workflows::http::{error_response, repository_status, DecisionBody, RejectionBody};
use crate::workflows::school::domain::{PaymentId, StudentId};
use crate::workflows::school::notify::Notifier;

/// Router builder exposing payment submission and review endpoints.
pub fn payment_router<S, N>(service: Arc<PaymentVerificationService<S, N>>) -> Router
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/payments", post(submit_handler::<S, N>))
        .route("/api/v1/payments/pending", get(pending_handler::<S, N>))
        .route("/api/v1/payments/:payment_id", get(status_handler::<S, N>))
        .route(
            "/api/v1/payments/:payment_id/verify",
            post(verify_handler::<S, N>),
        )
        .route(
            "/api/v1/payments/:payment_id/reject",
            post(reject_handler::<S, N>),
        )
        .route(
            "/api/v1/students/:student_id/subscriptions",
            get(subscriptions_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) fn payment_error_status(error: &PaymentError) -> StatusCode {
    match error {
        PaymentError::UnknownStudent(_)
        | PaymentError::UnknownParent(_)
        | PaymentError::UnknownCourse(_) => StatusCode::NOT_FOUND,
        PaymentError::PayerMismatch => StatusCode::FORBIDDEN,
        PaymentError::InvalidAmount(_)
        | PaymentError::MissingReceipt
        | PaymentError::ReasonRequired => StatusCode::UNPROCESSABLE_ENTITY,
        PaymentError::InvalidState(_) => StatusCode::CONFLICT,
        PaymentError::Repository(inner) => repository_status(inner),
    }
}

fn payment_error_response(error: PaymentError) -> Response {
    error_response(payment_error_status(&error), &error)
}

fn payment_response(status: StatusCode, result: Result<Payment, PaymentError>) -> Response {
    match result {
        Ok(payment) => (status, axum::Json(PaymentView::from(&payment))).into_response(),
        Err(error) => payment_error_response(error),
    }
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<PaymentVerificationService<S, N>>>,
    axum::Json(submission): axum::Json<PaymentSubmission>,
) -> Response
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    payment_response(
        StatusCode::ACCEPTED,
        service.submit_payment(submission, Utc::now()),
    )
}

pub(crate) async fn pending_handler<S, N>(
    State(service): State<Arc<PaymentVerificationService<S, N>>>,
) -> Response
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.pending() {
        Ok(payments) => {
            let views: Vec<PaymentView> = payments.iter().map(PaymentView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => payment_error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<PaymentVerificationService<S, N>>>,
    Path(payment_id): Path<String>,
) -> Response
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    payment_response(StatusCode::OK, service.get(&PaymentId(payment_id)))
}

pub(crate) async fn verify_handler<S, N>(
    State(service): State<Arc<PaymentVerificationService<S, N>>>,
    Path(payment_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    payment_response(
        StatusCode::OK,
        service.verify(&PaymentId(payment_id), &body.actor, body.notes, Utc::now()),
    )
}

pub(crate) async fn reject_handler<S, N>(
    State(service): State<Arc<PaymentVerificationService<S, N>>>,
    Path(payment_id): Path<String>,
    axum::Json(body): axum::Json<RejectionBody>,
) -> Response
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    payment_response(
        StatusCode::OK,
        service.reject(&PaymentId(payment_id), &body.actor, &body.reason, Utc::now()),
    )
}

pub(crate) async fn subscriptions_handler<S, N>(
    State(service): State<Arc<PaymentVerificationService<S, N>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: PaymentRepository + EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.subscriptions(&StudentId(student_id)) {
        Ok(subscriptions) => {
            let views: Vec<SubscriptionView> =
                subscriptions.iter().map(SubscriptionView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => payment_error_response(error),
    }
}
