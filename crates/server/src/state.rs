// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use parcelwise_core::{CategoryCatalog, ClassifierFactory};
use parcelwise_db::Database;

use crate::jobs::JobRunner;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// User directory store.
    pub db: Database,
    /// Status taxonomy handed to every classifier call. Read-only.
    pub catalog: Arc<CategoryCatalog>,
    /// Maps a provider name onto an adapter.
    pub classifiers: ClassifierFactory,
    /// Background job runner for the demo tasks.
    pub jobs: Arc<JobRunner>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(
        db: Database,
        catalog: CategoryCatalog,
        classifiers: ClassifierFactory,
        jobs: Arc<JobRunner>,
    ) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            catalog: Arc::new(catalog),
            classifiers,
            jobs,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
