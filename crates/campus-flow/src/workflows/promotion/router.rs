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

use super::domain::{PromotionChanges, PromotionType};
use super::repository::{PromotionRepository, PromotionView};
use super::service::{PromotionError, PromotionService};
use crate::workflows::http::{error_response, repository_status, DecisionBody, RejectionBody};
use crate::workflows::school::domain::{LevelId, PromotionId, StudentId, UserId};
use crate::workflows::school::notify::Notifier;

#[derive(Debug, Deserialize)]
pub(crate) struct ProposalBody {
    pub(crate) student: StudentId,
    pub(crate) to_level: LevelId,
    pub(crate) promotion_type: PromotionType,
    pub(crate) actor: UserId,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

/// Router builder exposing promotion proposal and review endpoints.
pub fn promotion_router<S, N>(service: Arc<PromotionService<S, N>>) -> Router
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/promotions", post(propose_handler::<S, N>))
        .route(
            "/api/v1/promotions/:promotion_id",
            get(status_handler::<S, N>)
                .patch(edit_handler::<S, N>)
                .delete(delete_handler::<S, N>),
        )
        .route(
            "/api/v1/promotions/:promotion_id/approve",
            post(approve_handler::<S, N>),
        )
        .route(
            "/api/v1/promotions/:promotion_id/reject",
            post(reject_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) fn promotion_error_status(error: &PromotionError) -> StatusCode {
    match error {
        PromotionError::UnknownStudent(_) | PromotionError::UnknownLevel(_) => {
            StatusCode::NOT_FOUND
        }
        PromotionError::InvalidPromotion(_) | PromotionError::ReasonRequired => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PromotionError::PendingPromotionExists | PromotionError::InvalidState(_) => {
            StatusCode::CONFLICT
        }
        PromotionError::Repository(inner) => repository_status(inner),
    }
}

fn promotion_error_response(error: PromotionError) -> Response {
    error_response(promotion_error_status(&error), &error)
}

pub(crate) async fn propose_handler<S, N>(
    State(service): State<Arc<PromotionService<S, N>>>,
    axum::Json(body): axum::Json<ProposalBody>,
) -> Response
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    match service.propose(
        &body.student,
        &body.to_level,
        body.promotion_type,
        &body.actor,
        body.notes,
        Utc::now(),
    ) {
        Ok(promotion) => (
            StatusCode::CREATED,
            axum::Json(PromotionView::from(&promotion)),
        )
            .into_response(),
        Err(error) => promotion_error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<PromotionService<S, N>>>,
    Path(promotion_id): Path<String>,
) -> Response
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    match service.get(&PromotionId(promotion_id)) {
        Ok(promotion) => (StatusCode::OK, axum::Json(PromotionView::from(&promotion))).into_response(),
        Err(error) => promotion_error_response(error),
    }
}

pub(crate) async fn edit_handler<S, N>(
    State(service): State<Arc<PromotionService<S, N>>>,
    Path(promotion_id): Path<String>,
    axum::Json(changes): axum::Json<PromotionChanges>,
) -> Response
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    match service.edit(&PromotionId(promotion_id), changes) {
        Ok(promotion) => (StatusCode::OK, axum::Json(PromotionView::from(&promotion))).into_response(),
        Err(error) => promotion_error_response(error),
    }
}

pub(crate) async fn delete_handler<S, N>(
    State(service): State<Arc<PromotionService<S, N>>>,
    Path(promotion_id): Path<String>,
) -> Response
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    match service.delete(&PromotionId(promotion_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => promotion_error_response(error),
    }
}

pub(crate) async fn approve_handler<S, N>(
    State(service): State<Arc<PromotionService<S, N>>>,
    Path(promotion_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    let id = PromotionId(promotion_id);
    match service.approve(&id, &body.actor, Utc::now()) {
        Ok(applied) => (
            StatusCode::OK,
            axum::Json(json!({ "promotion_id": id, "applied": applied })),
        )
            .into_response(),
        Err(error) => promotion_error_response(error),
    }
}

pub(crate) async fn reject_handler<S, N>(
    State(service): State<Arc<PromotionService<S, N>>>,
    Path(promotion_id): Path<String>,
    axum::Json(body): axum::Json<RejectionBody>,
) -> Response
where
    S: PromotionRepository + 'static,
    N: Notifier + 'static,
{
    match service.reject(
        &PromotionId(promotion_id),
        &body.actor,
        &body.reason,
        Utc::now(),
    ) {
        Ok(promotion) => (StatusCode::OK, axum::Json(PromotionView::from(&promotion))).into_response(),
        Err(error) => promotion_error_response(error),
    }
}
