//! Process-wide logging, error reporting and metrics setup.

use crate::config::{CommonConfig, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use shared::metrics_defs::describe;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("invalid sentry dsn: {0}")]
    InvalidDsn(#[from] sentry::types::ParseDsnError),
    #[error("could not install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
    #[error("could not build statsd exporter: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),
    #[error("a metrics recorder is already installed")]
    RecorderInstalled,
}

/// Keeps the Sentry client alive. Dropping it flushes pending events.
pub struct TelemetryGuard {
    _sentry: Option<sentry::ClientInitGuard>,
}

pub fn init(config: &CommonConfig) -> Result<TelemetryGuard, TelemetryError> {
    let logging = config.logging.clone().unwrap_or_default();
    let sentry = init_sentry(&logging)?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;
    let sentry_layer = sentry
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .try_init()?;

    if let Some(metrics) = &config.metrics {
        init_metrics(metrics)?;
    }

    Ok(TelemetryGuard { _sentry: sentry })
}

fn init_sentry(logging: &LoggingConfig) -> Result<Option<sentry::ClientInitGuard>, TelemetryError> {
    let Some(dsn) = &logging.sentry_dsn else {
        return Ok(None);
    };

    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn.parse()?),
        release: sentry::release_name!(),
        traces_sample_rate: logging.traces_sample_rate,
        ..Default::default()
    });
    Ok(Some(guard))
}

fn init_metrics(config: &MetricsConfig) -> Result<(), TelemetryError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(config.prefix.as_str()))?;
    metrics::set_global_recorder(recorder).map_err(|_| TelemetryError::RecorderInstalled)?;

    for defs in [
        shared::metrics_defs::ALL_METRICS,
        resolver::metrics_defs::ALL_METRICS,
        provisioner::metrics_defs::ALL_METRICS,
        api::metrics_defs::ALL_METRICS,
    ] {
        describe(defs);
    }

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        prefix = %config.prefix,
        "Metrics exporter installed"
    );
    Ok(())
}
