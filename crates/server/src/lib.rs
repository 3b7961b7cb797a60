// crates/server/src/lib.rs
//! Parcelwise server library.
//!
//! Axum HTTP server exposing the user directory, the arithmetic demo, the
//! shipment-status classification endpoint and the background job API.

pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ServerArgs;
pub use error::*;
pub use jobs::{JobRunner, Scheduler};
pub use metrics::{init_metrics, render_metrics};
pub use routes::api_routes;
pub use state::AppState;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes
/// - CORS (allows any origin)
/// - Request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    create_app_full(state, None)
}

/// Same as [`create_app`], additionally serving `static_dir` under `/static`.
pub fn create_app_full(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = api_routes(state);
    if let Some(dir) = static_dir {
        tracing::info!(dir = %dir.display(), "Serving static files under /static");
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(cors).layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
