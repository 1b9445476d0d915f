use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::domain::ParentInfo;
use super::repository::{EnrollmentRepository, EnrollmentRequestView};
use super::service::{EnrollmentError, EnrollmentService};
use crate::workflows::http::{error_response, repository_status, DecisionBody, RejectionBody};
use crate::workflows::school::domain::{
    CourseId, EnrollmentId, EnrollmentRequestId, Frequency, StudentId,
};
use crate::workflows::school::notify::Notifier;

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentRequestBody {
    pub(crate) student: StudentId,
    pub(crate) course: CourseId,
    pub(crate) frequency: Frequency,
    #[serde(default)]
    pub(crate) parent_info: Option<ParentInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionBody {
    pub(crate) final_grade: f32,
}

/// Router builder exposing enrollment request and enrollment lifecycle endpoints.
pub fn enrollment_router<S, N>(service: Arc<EnrollmentService<S, N>>) -> Router
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/enrollments/requests",
            post(submit_handler::<S, N>),
        )
        .route(
            "/api/v1/enrollments/requests/:request_id",
            get(status_handler::<S, N>),
        )
        .route(
            "/api/v1/enrollments/requests/:request_id/approve",
            post(approve_handler::<S, N>),
        )
        .route(
            "/api/v1/enrollments/requests/:request_id/reject",
            post(reject_handler::<S, N>),
        )
        .route(
            "/api/v1/enrollments/requests/:request_id/cancel",
            post(cancel_handler::<S, N>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/progress",
            post(progress_handler::<S, N>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/complete",
            post(complete_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) fn enrollment_error_status(error: &EnrollmentError) -> StatusCode {
    match error {
        EnrollmentError::UnknownStudent(_) | EnrollmentError::UnknownCourse(_) => {
            StatusCode::NOT_FOUND
        }
        EnrollmentError::DuplicateOpenRequest
        | EnrollmentError::AlreadyEnrolled
        | EnrollmentError::InvalidState(_)
        | EnrollmentError::AlreadyTerminal(_) => StatusCode::CONFLICT,
        EnrollmentError::CourseInactive(_)
        | EnrollmentError::UnsupportedFrequency(_)
        | EnrollmentError::ParentInfoRequired
        | EnrollmentError::InvalidParentInfo(_)
        | EnrollmentError::ReasonRequired
        | EnrollmentError::InvalidGrade(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EnrollmentError::Repository(inner) => repository_status(inner),
    }
}

fn enrollment_error_response(error: EnrollmentError) -> Response {
    error_response(enrollment_error_status(&error), &error)
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    axum::Json(body): axum::Json<EnrollmentRequestBody>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.submit_request(
        &body.student,
        &body.course,
        body.frequency,
        body.parent_info,
        Utc::now(),
    ) {
        Ok(request) => (
            StatusCode::ACCEPTED,
            axum::Json(EnrollmentRequestView::from(&request)),
        )
            .into_response(),
        Err(error) => enrollment_error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.get_request(&EnrollmentRequestId(request_id)) {
        Ok(request) => (
            StatusCode::OK,
            axum::Json(EnrollmentRequestView::from(&request)),
        )
            .into_response(),
        Err(error) => enrollment_error_response(error),
    }
}

pub(crate) async fn approve_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.approve(&EnrollmentRequestId(request_id), &body.actor, Utc::now()) {
        Ok(enrollment) => (StatusCode::CREATED, axum::Json(enrollment)).into_response(),
        Err(error) => enrollment_error_response(error),
    }
}

pub(crate) async fn reject_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<RejectionBody>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.reject(
        &EnrollmentRequestId(request_id),
        &body.actor,
        &body.reason,
        Utc::now(),
    ) {
        Ok(request) => (
            StatusCode::OK,
            axum::Json(EnrollmentRequestView::from(&request)),
        )
            .into_response(),
        Err(error) => enrollment_error_response(error),
    }
}

pub(crate) async fn cancel_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.cancel(&EnrollmentRequestId(request_id), Utc::now()) {
        Ok(request) => (
            StatusCode::OK,
            axum::Json(EnrollmentRequestView::from(&request)),
        )
            .into_response(),
        Err(error) => enrollment_error_response(error),
    }
}

pub(crate) async fn progress_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    Path(enrollment_id): Path<String>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.update_progress(&EnrollmentId(enrollment_id)) {
        Ok(enrollment) => (StatusCode::OK, axum::Json(enrollment)).into_response(),
        Err(error) => enrollment_error_response(error),
    }
}

pub(crate) async fn complete_handler<S, N>(
    State(service): State<Arc<EnrollmentService<S, N>>>,
    Path(enrollment_id): Path<String>,
    axum::Json(body): axum::Json<CompletionBody>,
) -> Response
where
    S: EnrollmentRepository + 'static,
    N: Notifier + 'static,
{
    match service.complete(&EnrollmentId(enrollment_id), body.final_grade, Utc::now()) {
        Ok(enrollment) => (StatusCode::OK, axum::Json(enrollment)).into_response(),
        Err(error) => enrollment_error_response(error),
    }
}
