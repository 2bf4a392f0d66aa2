//! # canary-api: HTTP Server for the Warrant Canary
//!
//! ## API Surface
//!
//! | Path                 | Module                 | Purpose                         |
//! |----------------------|------------------------|---------------------------------|
//! | `/latest`            | [`routes::canary`]     | Latest proof                    |
//! | `/submit`            | [`routes::canary`]     | Submit a renewal                |
//! | `/status`            | [`routes::canary`]     | Deadline, finality, trigger     |
//! | `/key`               | [`routes::canary`]     | Verification key                |
//! | `/metrics`           | [`routes::metrics`]    | Prometheus scrape               |
//! | `/health/*`          | this module            | Liveness and readiness probes   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → TimeoutLayer → body limit (100 KiB) → Handler
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Assemble the application router with all enabled routes and middleware.
pub fn app(state: AppState) -> Router {
    let views = state.config.views;
    let timeout = Duration::from_secs(state.config.timeout_secs);

    let api = Router::new()
        .merge(routes::canary::router(views))
        .merge(routes::metrics::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: state is loaded before the router exists, so always ready.
async fn readiness() -> &'static str {
    "ready"
}
