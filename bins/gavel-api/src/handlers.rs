// HTTP route handlers for the Gavel API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use gavel_common::types::Job;
use gavel_core::{run_job, JudgeError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::{metrics, AppState};

/// POST /judge - Run a job synchronously and return its tally
///
/// Errored and failed entries inside the tally are ordinary outcomes; an
/// error response means no tally could be produced at all.
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(job): Json<Job>,
) -> Response {
    metrics::record_job_submitted(&job.language);

    info!(
        job_id = %job.id,
        language = %job.language,
        test_cases = job.test_cases.len(),
        source_size = job.source_code.len(),
        "received job"
    );

    let started = Instant::now();

    match run_job(&job, &state.engine, &state.profiles, state.timeout).await {
        Ok(results) => {
            metrics::record_job_completed(
                &job.language,
                "completed",
                started.elapsed().as_millis() as f64,
            );
            metrics::record_verdicts(&results);

            info!(
                job_id = %job.id,
                passed = results.passed,
                failed = results.failed,
                errored = results.errored,
                duration_ms = started.elapsed().as_millis() as u64,
                "job judged"
            );

            (StatusCode::OK, Json(results)).into_response()
        }
        Err(e) => {
            metrics::record_job_completed(
                &job.language,
                "failed",
                started.elapsed().as_millis() as f64,
            );

            let status = match e {
                JudgeError::UnsupportedLanguage(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            error!(job_id = %job.id, error = %e, "job failed");

            (
                status,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics in text format
pub async fn metrics_endpoint() -> impl IntoResponse {
    metrics::render_metrics()
}
