use crate::infra::{AppState, Workflows};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use campus_flow::error::AppError;
use campus_flow::workflows::enrollment::enrollment_router;
use campus_flow::workflows::jobs::{JobKind, JobReport, ScheduledJobs};
use campus_flow::workflows::linking::linking_router;
use campus_flow::workflows::payments::payment_router;
use campus_flow::workflows::promotion::promotion_router;
use campus_flow::workflows::reporting::reporting_router;
use campus_flow::workflows::school::{InMemorySchoolStore, Notifier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

type Jobs<N> = ScheduledJobs<InMemorySchoolStore, N>;

#[derive(Debug, Serialize)]
pub(crate) struct JobScheduleEntry {
    pub(crate) job: &'static str,
    pub(crate) schedule: String,
    pub(crate) next_run: DateTime<Utc>,
    pub(crate) running: bool,
}

pub(crate) fn with_workflow_routes<N>(workflows: &Workflows<N>) -> Router
where
    N: Notifier + 'static,
{
    let jobs = Router::new()
        .route("/api/v1/jobs", get(job_schedule_endpoint::<N>))
        .route("/api/v1/jobs/:job/run", post(run_job_endpoint::<N>))
        .with_state(workflows.jobs.clone());

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(linking_router(workflows.linking.clone()))
        .merge(enrollment_router(workflows.enrollment.clone()))
        .merge(promotion_router(workflows.promotion.clone()))
        .merge(payment_router(workflows.payments.clone()))
        .merge(reporting_router(workflows.reporting.clone()))
        .merge(jobs)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn job_schedule_endpoint<N>(
    State(jobs): State<Arc<Jobs<N>>>,
) -> Json<Vec<JobScheduleEntry>>
where
    N: Notifier + 'static,
{
    let now = Utc::now();
    Json(schedule_entries(&jobs, now))
}

pub(crate) fn schedule_entries<N>(jobs: &Jobs<N>, now: DateTime<Utc>) -> Vec<JobScheduleEntry>
where
    N: Notifier + 'static,
{
    JobKind::ALL
        .into_iter()
        .map(|kind| JobScheduleEntry {
            job: kind.label(),
            schedule: kind.schedule().to_string(),
            next_run: kind.next_run_after(now),
            running: jobs.lock().is_running(kind),
        })
        .collect()
}

/// Operator trigger for a single job, outside its schedule.
pub(crate) async fn run_job_endpoint<N>(
    State(jobs): State<Arc<Jobs<N>>>,
    Path(job): Path<String>,
) -> Response
where
    N: Notifier + 'static,
{
    let kind = match job.parse::<JobKind>() {
        Ok(kind) => kind,
        Err(err) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    };

    match jobs.run(kind, Utc::now()) {
        Ok(report) => (StatusCode::OK, Json::<JobReport>(report)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
