use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use campus_flow::config::WorkflowConfig;
use campus_flow::workflows::enrollment::EnrollmentService;
use campus_flow::workflows::jobs::ScheduledJobs;
use campus_flow::workflows::linking::AccountLinkingService;
use campus_flow::workflows::payments::PaymentVerificationService;
use campus_flow::workflows::promotion::PromotionService;
use campus_flow::workflows::reporting::ProgressReporter;
use campus_flow::workflows::school::{InMemorySchoolStore, Notification, Notifier, NotifyError};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Delivers notifications to the log. Stands in for the mail and SMS gateways.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let details = serde_json::to_string(&notification.details)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        info!(
            target: "campus_flow::notifications",
            kind = notification.kind.label(),
            recipient = ?notification.recipient,
            %details,
            "notification delivered"
        );
        Ok(())
    }
}

/// Every workflow service wired over one shared store and notifier.
pub(crate) struct Workflows<N> {
    pub(crate) store: Arc<InMemorySchoolStore>,
    pub(crate) linking: Arc<AccountLinkingService<InMemorySchoolStore, N>>,
    pub(crate) enrollment: Arc<EnrollmentService<InMemorySchoolStore, N>>,
    pub(crate) promotion: Arc<PromotionService<InMemorySchoolStore, N>>,
    pub(crate) payments: Arc<PaymentVerificationService<InMemorySchoolStore, N>>,
    pub(crate) reporting: Arc<ProgressReporter<InMemorySchoolStore>>,
    pub(crate) jobs: Arc<ScheduledJobs<InMemorySchoolStore, N>>,
}

impl<N> Workflows<N>
where
    N: Notifier + 'static,
{
    pub(crate) fn new(store: InMemorySchoolStore, notifier: N, config: &WorkflowConfig) -> Self {
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);
        Self {
            linking: Arc::new(AccountLinkingService::new(store.clone(), notifier.clone())),
            enrollment: Arc::new(EnrollmentService::new(
                store.clone(),
                notifier.clone(),
                config,
            )),
            promotion: Arc::new(PromotionService::new(store.clone(), notifier.clone())),
            payments: Arc::new(PaymentVerificationService::new(
                store.clone(),
                notifier.clone(),
                config,
            )),
            reporting: Arc::new(ProgressReporter::new(store.clone(), config)),
            jobs: Arc::new(ScheduledJobs::new(store.clone(), notifier, config)),
            store,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2025-09-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
        );
        let err = parse_date("01/09/2025").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }
}
