//! API route handlers for the parcelwise server.

pub mod arithmetic;
pub mod health;
pub mod jobs;
pub mod metrics;
pub mod root;
pub mod status;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router.
///
/// Routes:
/// - GET / - Greeting
/// - GET /health - Health check
/// - GET /metrics - Prometheus metrics
/// - /users, /users/search, /users/{id} - User directory
/// - GET /arithmetic/{op}/{a}/{b} - Arithmetic demo
/// - POST /status/classify - Classify shipment statuses with an LLM
/// - /jobs, /jobs/sample, /jobs/{id}, /jobs/stream - Background jobs
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(root::router())
        .merge(health::router())
        .merge(metrics::router())
        .merge(users::router())
        .merge(arithmetic::router())
        .merge(status::router())
        .merge(jobs::router())
        .with_state(state)
}
