//! # Canary Wire Protocol
//!
//! - **GET `/latest`**: latest proof as `text/plain`, or 204 when none exists
//! - **POST `/submit`**: form field `proof`; 204 when accepted
//! - **GET `/status`**: [`StatusReport`] JSON
//! - **GET `/key`**: hex public key submissions are verified against
//!
//! Each view can be switched off in configuration; a disabled view is not
//! mounted and answers 404.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use canary_core::StatusReport;
use canary_state::SubmitError;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::{AppState, Views};

/// Counter of submissions, labelled by `outcome`.
pub const SUBMISSIONS_METRIC: &str = "canary_submissions_total";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Form body of `POST /submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    /// Armored proof text.
    pub proof: String,
}

/// Build the canary router with only the enabled views.
pub fn router(views: Views) -> Router<AppState> {
    let mut router = Router::new();
    if views.latest {
        router = router.route("/latest", get(latest));
    }
    if views.submit {
        router = router.route("/submit", post(submit));
    }
    if views.status {
        router = router.route("/status", get(status));
    }
    if views.getkey {
        router = router.route("/key", get(key));
    }
    router
}

/// GET /latest: Latest accepted proof.
async fn latest(State(state): State<AppState>) -> Response {
    match state.canary.latest_proof() {
        Some(proof) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], proof).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// POST /submit: Validate and store a new proof.
async fn submit(
    State(state): State<AppState>,
    form: Result<Form<SubmitForm>, FormRejection>,
) -> Result<StatusCode, AppError> {
    let Form(SubmitForm { proof }) = form.map_err(|rejection| {
        record_submission("malformed_request");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })?;

    // The store append syncs to disk; keep it off the async workers.
    let canary = Arc::clone(&state.canary);
    let result = tokio::task::spawn_blocking(move || canary.submit(&proof))
        .await
        .map_err(|e| AppError::Internal(format!("submission task failed: {e}")))?;

    match result {
        Ok(_) => {
            record_submission("accepted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            record_submission(outcome_label(&err));
            tracing::info!(error = %err, kind = %err.kind(), "rejected submission");
            Err(err.into())
        }
    }
}

/// GET /status: Server metadata.
async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.canary.status(state.triggered()))
}

/// GET /key: Public key text.
async fn key(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        state.canary.public_key_text(),
    )
}

fn outcome_label(err: &SubmitError) -> &'static str {
    match err {
        SubmitError::Proof(_) => "rejected_proof",
        SubmitError::Format(_) => "rejected_format",
        SubmitError::Succession(_) => "rejected_succession",
        SubmitError::Storage(_) => "storage_error",
    }
}

fn record_submission(outcome: &'static str) {
    metrics::counter!(SUBMISSIONS_METRIC, "outcome" => outcome).increment(1);
}
