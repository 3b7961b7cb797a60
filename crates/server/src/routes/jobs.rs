// crates/server/src/routes/jobs.rs
//! API routes for background jobs.
//!
//! - POST /jobs/sample: queue a `sample_task`
//! - GET /jobs: list active background jobs
//! - GET /jobs/{id}: snapshot of one job, finished or not
//! - DELETE /jobs/{id}: cancel a pending or running job
//! - GET /jobs/stream: SSE stream of job progress updates

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::error::{ApiError, ApiResult};
use crate::jobs::tasks::spawn_sample_task;
use crate::jobs::{JobId, JobProgress, SampleTaskArgs};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub job_id: JobId,
}

/// POST /jobs/sample - Queue a sample task; returns immediately.
async fn start_sample(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SampleTaskArgs>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JobAccepted>)> {
    let Json(args) = body?;
    let job_id = spawn_sample_task(&state.jobs, args);
    tracing::info!(job_id, a = args.a, "Queued sample task");
    Ok((StatusCode::ACCEPTED, Json(JobAccepted { job_id })))
}

/// GET /jobs - List all active jobs.
async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobProgress>> {
    Json(state.jobs.active_jobs())
}

/// GET /jobs/{id} - Snapshot of a single job.
async fn get_job(
    State(state): State<Arc<AppState>>,
    id: Result<Path<JobId>, PathRejection>,
) -> ApiResult<Json<JobProgress>> {
    let Path(id) = id?;
    state
        .jobs
        .get_job(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {id} not found")))
}

/// DELETE /jobs/{id} - Cancel a job that has not finished yet.
async fn cancel_job(
    State(state): State<Arc<AppState>>,
    id: Result<Path<JobId>, PathRejection>,
) -> ApiResult<Json<JobProgress>> {
    let Path(id) = id?;
    if !state.jobs.cancel(id) {
        return Err(ApiError::NotFound(format!("No running job {id}")));
    }
    tracing::info!(job_id = id, "Cancelling job");
    state
        .jobs
        .get_job(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {id} not found")))
}

/// GET /jobs/stream - SSE stream of all job progress updates.
async fn stream_jobs(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.jobs.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(progress) => match Event::default().json_data(&progress) {
                    Ok(event) => yield Ok(event),
                    Err(e) => tracing::warn!("Failed to encode job progress: {e}"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Job stream subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Build the jobs router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/sample", post(start_sample))
        .route("/jobs/stream", get(stream_jobs))
        .route("/jobs/{id}", get(get_job).delete(cancel_job))
}
