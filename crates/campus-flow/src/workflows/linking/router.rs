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
use serde_json::json;

use super::domain::LinkRequestDetails;
use super::repository::{LinkRequestView, LinkingRepository};
use super::service::{AccountLinkingService, LinkingError};
use crate::workflows::http::{error_response, repository_status, DecisionBody, RejectionBody};
use crate::workflows::school::domain::{LinkRequestId, ParentId, StudentId};
use crate::workflows::school::notify::Notifier;

#[derive(Debug, Deserialize)]
pub(crate) struct LinkRequestBody {
    pub(crate) parent: ParentId,
    pub(crate) student: StudentId,
    #[serde(flatten)]
    pub(crate) details: LinkRequestDetails,
}

/// Router builder exposing the parent linking endpoints.
pub fn linking_router<S, N>(service: Arc<AccountLinkingService<S, N>>) -> Router
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/links", post(request_handler::<S, N>))
        .route("/api/v1/links/pending", get(pending_handler::<S, N>))
        .route("/api/v1/links/:request_id", get(status_handler::<S, N>))
        .route(
            "/api/v1/links/:request_id/approve",
            post(approve_handler::<S, N>),
        )
        .route(
            "/api/v1/links/:request_id/reject",
            post(reject_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) fn linking_error_status(error: &LinkingError) -> StatusCode {
    match error {
        LinkingError::UnknownParent(_) | LinkingError::UnknownStudent(_) => StatusCode::NOT_FOUND,
        LinkingError::DuplicateLink | LinkingError::DuplicatePendingRequest => StatusCode::CONFLICT,
        LinkingError::ReasonRequired => StatusCode::UNPROCESSABLE_ENTITY,
        LinkingError::InvalidState(_) => StatusCode::CONFLICT,
        LinkingError::Repository(inner) => repository_status(inner),
    }
}

fn linking_error_response(error: LinkingError) -> Response {
    error_response(linking_error_status(&error), &error)
}

pub(crate) async fn request_handler<S, N>(
    State(service): State<Arc<AccountLinkingService<S, N>>>,
    axum::Json(body): axum::Json<LinkRequestBody>,
) -> Response
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    match service.request_link(&body.parent, &body.student, body.details, Utc::now()) {
        Ok(request) => (
            StatusCode::ACCEPTED,
            axum::Json(LinkRequestView::from(&request)),
        )
            .into_response(),
        Err(error) => linking_error_response(error),
    }
}

pub(crate) async fn pending_handler<S, N>(
    State(service): State<Arc<AccountLinkingService<S, N>>>,
) -> Response
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    match service.pending() {
        Ok(requests) => {
            let views: Vec<LinkRequestView> = requests.iter().map(LinkRequestView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => linking_error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<AccountLinkingService<S, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    match service.get(&LinkRequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(LinkRequestView::from(&request))).into_response(),
        Err(error) => linking_error_response(error),
    }
}

pub(crate) async fn approve_handler<S, N>(
    State(service): State<Arc<AccountLinkingService<S, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    let id = LinkRequestId(request_id);
    match service.approve(&id, &body.actor, body.notes, Utc::now()) {
        Ok(linked) => (
            StatusCode::OK,
            axum::Json(json!({ "request_id": id, "linked": linked })),
        )
            .into_response(),
        Err(error) => linking_error_response(error),
    }
}

pub(crate) async fn reject_handler<S, N>(
    State(service): State<Arc<AccountLinkingService<S, N>>>,
    Path(request_id): Path<String>,
    axum::Json(body): axum::Json<RejectionBody>,
) -> Response
where
    S: LinkingRepository + 'static,
    N: Notifier + 'static,
{
    match service.reject(&LinkRequestId(request_id), &body.actor, &body.reason, Utc::now()) {
        Ok(request) => (StatusCode::OK, axum::Json(LinkRequestView::from(&request))).into_response(),
        Err(error) => linking_error_response(error),
    }
}
