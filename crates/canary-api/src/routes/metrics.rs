//! # Prometheus Metrics
//!
//! **GET `/metrics`** renders the installed recorder in Prometheus text
//! format. Without a recorder (tests, embedded use) it answers 404.

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render))
}

async fn render(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("metrics exporter not installed".into()))
}
