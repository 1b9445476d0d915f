//! Response helpers shared by the workflow routers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::workflows::school::domain::UserId;
use crate::workflows::school::repository::RepositoryError;

pub(crate) fn error_response(status: StatusCode, error: &dyn std::fmt::Display) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body for admin decisions; the acting user is always explicit.
#[derive(Debug, Deserialize)]
pub(crate) struct DecisionBody {
    pub(crate) actor: UserId,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectionBody {
    pub(crate) actor: UserId,
    pub(crate) reason: String,
}
