use crate::cli::ServeArgs;
use crate::infra::{AppState, LoggingNotifier, Workflows};
use crate::routes::with_workflow_routes;
use crate::scheduler::spawn_job_timers;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use campus_flow::config::AppConfig;
use campus_flow::error::AppError;
use campus_flow::telemetry;
use campus_flow::workflows::school::InMemorySchoolStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.no_scheduler {
        config.workflow.scheduler_enabled = false;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let workflows = Workflows::new(
        InMemorySchoolStore::new(),
        LoggingNotifier,
        &config.workflow,
    );
    if config.workflow.scheduler_enabled {
        spawn_job_timers(workflows.jobs.clone());
    } else {
        info!("job scheduler disabled");
    }

    let app = with_workflow_routes(&workflows)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "campus workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
