//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Cloning is cheap: everything is behind an `Arc` or
//! a watch receiver.

use std::sync::Arc;

use canary_state::{CanaryState, Phase};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::watch;

use crate::config::HttpConfig;

/// Which canary views are mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Views {
    pub submit: bool,
    pub status: bool,
    pub latest: bool,
    pub getkey: bool,
}

impl Default for Views {
    fn default() -> Self {
        Self {
            submit: true,
            status: true,
            latest: true,
            getkey: true,
        }
    }
}

impl From<&HttpConfig> for Views {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            submit: cfg.enable_submit,
            status: cfg.enable_status,
            latest: cfg.enable_latest,
            getkey: cfg.enable_getkey,
        }
    }
}

/// Runtime settings for the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub views: Views,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            views: Views::default(),
            timeout_secs: 30,
        }
    }
}

impl From<&HttpConfig> for AppConfig {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            views: Views::from(cfg),
            timeout_secs: cfg.timeout_secs,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The coordinator holding the latest accepted canary.
    pub canary: Arc<CanaryState>,
    /// Action runner phase, for `triggered` in status reports.
    pub phase: watch::Receiver<Phase>,
    /// Prometheus handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("canary", &self.canary)
            .field("phase", &*self.phase.borrow())
            .field("metrics", &self.metrics.as_ref().map(|_| "[installed]"))
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    pub fn new(canary: Arc<CanaryState>, phase: watch::Receiver<Phase>) -> Self {
        Self {
            canary,
            phase,
            metrics: None,
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Whether the dead-man's switch has fired.
    pub fn triggered(&self) -> bool {
        self.phase.borrow().is_terminal()
    }
}
