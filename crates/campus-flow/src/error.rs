use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::enrollment::router::enrollment_error_status;
use crate::workflows::enrollment::EnrollmentError;
use crate::workflows::jobs::JobError;
use crate::workflows::linking::router::linking_error_status;
use crate::workflows::linking::LinkingError;
use crate::workflows::payments::router::payment_error_status;
use crate::workflows::payments::PaymentError;
use crate::workflows::promotion::router::promotion_error_status;
use crate::workflows::promotion::PromotionError;
use crate::workflows::reporting::router::reporting_error_status;
use crate::workflows::reporting::ReportingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Linking(LinkingError),
    Enrollment(EnrollmentError),
    Promotion(PromotionError),
    Payment(PaymentError),
    Reporting(ReportingError),
    Job(JobError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Linking(err) => write!(f, "account linking error: {}", err),
            AppError::Enrollment(err) => write!(f, "enrollment error: {}", err),
            AppError::Promotion(err) => write!(f, "promotion error: {}", err),
            AppError::Payment(err) => write!(f, "payment error: {}", err),
            AppError::Reporting(err) => write!(f, "reporting error: {}", err),
            AppError::Job(err) => write!(f, "job error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Linking(err) => Some(err),
            AppError::Enrollment(err) => Some(err),
            AppError::Promotion(err) => Some(err),
            AppError::Payment(err) => Some(err),
            AppError::Reporting(err) => Some(err),
            AppError::Job(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Linking(err) => linking_error_status(err),
            AppError::Enrollment(err) => enrollment_error_status(err),
            AppError::Promotion(err) => promotion_error_status(err),
            AppError::Payment(err) => payment_error_status(err),
            AppError::Reporting(err) => reporting_error_status(err),
            AppError::Job(JobError::AlreadyRunning(_)) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Job(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<LinkingError> for AppError {
    fn from(value: LinkingError) -> Self {
        Self::Linking(value)
    }
}

impl From<EnrollmentError> for AppError {
    fn from(value: EnrollmentError) -> Self {
        Self::Enrollment(value)
    }
}

impl From<PromotionError> for AppError {
    fn from(value: PromotionError) -> Self {
        Self::Promotion(value)
    }
}

impl From<PaymentError> for AppError {
    fn from(value: PaymentError) -> Self {
        Self::Payment(value)
    }
}

impl From<ReportingError> for AppError {
    fn from(value: ReportingError) -> Self {
        Self::Reporting(value)
    }
}

impl From<JobError> for AppError {
    fn from(value: JobError) -> Self {
        Self::Job(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::school::domain::InvalidTransition;
    use crate::workflows::school::repository::RepositoryError;

    #[test]
    fn workflow_errors_map_to_client_statuses() {
        let conflict = AppError::from(PaymentError::InvalidState(InvalidTransition {
            from: "verified",
            event: "verify",
        }));
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let missing = AppError::from(EnrollmentError::ParentInfoRequired);
        assert_eq!(
            missing.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn infrastructure_errors_map_to_server_error() {
        let unavailable = AppError::from(LinkingError::Repository(RepositoryError::Unavailable(
            "disk full".to_string(),
        )));
        assert_eq!(
            unavailable.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
