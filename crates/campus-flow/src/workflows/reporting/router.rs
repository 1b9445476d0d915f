use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;

use super::service::{ProgressReporter, ReportingError, ReportingSource};
use crate::workflows::http::{error_response, repository_status};
use crate::workflows::school::domain::{ParentId, StudentId};

/// Router builder exposing the read-only progress queries.
pub fn reporting_router<S>(reporter: Arc<ProgressReporter<S>>) -> Router
where
    S: ReportingSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/parents/:parent_id/children",
            get(children_handler::<S>),
        )
        .route(
            "/api/v1/parents/:parent_id/dashboard",
            get(dashboard_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/progress",
            get(student_handler::<S>),
        )
        .with_state(reporter)
}

pub(crate) fn reporting_error_status(error: &ReportingError) -> StatusCode {
    match error {
        ReportingError::UnknownStudent(_) | ReportingError::UnknownParent(_) => {
            StatusCode::NOT_FOUND
        }
        ReportingError::Repository(inner) => repository_status(inner),
    }
}

fn reporting_error_response(error: ReportingError) -> Response {
    error_response(reporting_error_status(&error), &error)
}

pub(crate) async fn children_handler<S>(
    State(reporter): State<Arc<ProgressReporter<S>>>,
    Path(parent_id): Path<String>,
) -> Response
where
    S: ReportingSource + 'static,
{
    match reporter.get_children_progress(&ParentId(parent_id)) {
        Ok(children) => (StatusCode::OK, axum::Json(children)).into_response(),
        Err(error) => reporting_error_response(error),
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(reporter): State<Arc<ProgressReporter<S>>>,
    Path(parent_id): Path<String>,
) -> Response
where
    S: ReportingSource + 'static,
{
    match reporter.get_parent_dashboard(&ParentId(parent_id), Utc::now().date_naive()) {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => reporting_error_response(error),
    }
}

pub(crate) async fn student_handler<S>(
    State(reporter): State<Arc<ProgressReporter<S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: ReportingSource + 'static,
{
    match reporter.student_progress(&StudentId(student_id)) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => reporting_error_response(error),
    }
}
