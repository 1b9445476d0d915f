use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Log target the notification gateway writes deliveries under.
pub const NOTIFICATION_TARGET: &str = "campus_flow::notifications";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter `{value}`")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("could not install the tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level so operators can
/// raise verbosity for a single workflow target (e.g. `campus_flow::workflows::payments=debug`).
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.include_targets)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}

/// Parse the configured level. Notification deliveries stay visible at `info` unless the
/// level names the notification target itself.
fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let invalid = |source| TelemetryError::Filter {
        value: level.to_string(),
        source,
    };

    let filter = EnvFilter::try_new(level).map_err(invalid)?;
    if level.contains(NOTIFICATION_TARGET) {
        return Ok(filter);
    }
    let deliveries: Directive = format!("{NOTIFICATION_TARGET}=info").parse().map_err(invalid)?;
    Ok(filter.add_directive(deliveries))
}
