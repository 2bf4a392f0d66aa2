//! # canary-server: Binary Entry Point
//!
//! Loads configuration (`CANARY_CONFIG`, default `config.yaml`), verifies
//! the stored canary, starts the action runner and serves HTTP.

use std::fs::OpenOptions;
use std::sync::Arc;

use canary_api::bootstrap::{self, BootstrapError};
use canary_api::config::{LoggingConfig, ServerConfig};
use canary_api::state::{AppConfig, AppState};
use canary_core::SystemClock;
use canary_state::ActionOutcome;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_tracing(&config.logging)?;

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("Prometheus recorder not installed: {e}");
            None
        }
    };

    let booted = bootstrap::bootstrap(&config, Arc::new(SystemClock)).map_err(|e| {
        tracing::error!("Bootstrap failed: {e}");
        e
    })?;

    let bootstrap::Bootstrapped { state: canary, runner } = booted;
    let phase = runner.phase();
    tokio::spawn(async move {
        let report = runner.run().await;
        match &report.outcome {
            ActionOutcome::Failed { reason } => tracing::error!(
                deadline = %report.deadline,
                %reason,
                "canary lapsed and the failure action could not run"
            ),
            outcome => tracing::warn!(
                deadline = %report.deadline,
                triggered_at = %report.triggered_at,
                ?outcome,
                "canary lapsed"
            ),
        }
    });

    let mut state = AppState::new(canary, phase).with_config(AppConfig::from(&config.server));
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }
    let app = canary_api::app(state);

    let addr = config.server.socket_addr();
    tracing::info!("canary server listening on {}", addr);

    let listener = bootstrap::bind(addr).await?;
    axum::serve(listener, app).await.map_err(BootstrapError::Io)?;

    Ok(())
}

/// Structured logging to stdout, mirrored into `logging.file` when set.
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), BootstrapError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| BootstrapError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}
