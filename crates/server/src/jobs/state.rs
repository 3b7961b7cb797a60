// crates/server/src/jobs/state.rs
//! Atomic state tracking for a single background job.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::types::{JobId, JobProgress, JobStatus};

/// State for a single job.
///
/// Counters and status are lock-free atomics; message, result and finish
/// time sit behind `RwLock`s that are never held across an await.
pub struct JobState {
    id: JobId,
    job_type: String,
    status: AtomicU8,
    current: AtomicU64,
    total: AtomicU64,
    message: RwLock<Option<String>>,
    result: RwLock<Option<serde_json::Value>>,
    finished_at: RwLock<Option<DateTime<Utc>>>,
    progress_tx: broadcast::Sender<JobProgress>,
}

impl JobState {
    /// `progress_tx` is the runner-wide channel every update is published on.
    pub fn new(
        id: JobId,
        job_type: String,
        total: u64,
        progress_tx: broadcast::Sender<JobProgress>,
    ) -> Self {
        Self {
            id,
            job_type,
            status: AtomicU8::new(JobStatus::Pending as u8),
            current: AtomicU64::new(0),
            total: AtomicU64::new(total),
            message: RwLock::new(None),
            result: RwLock::new(None),
            finished_at: RwLock::new(None),
            progress_tx,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Transition the job to Running status.
    pub fn set_running(&self) {
        self.status.store(JobStatus::Running as u8, Ordering::Relaxed);
        self.broadcast_progress();
    }

    /// Increment the progress counter and broadcast an update.
    /// Returns the new current value.
    pub fn increment(&self) -> u64 {
        let new = self.current.fetch_add(1, Ordering::Relaxed) + 1;
        self.broadcast_progress();
        new
    }

    /// Set the human-readable progress message and broadcast.
    pub fn set_message(&self, msg: impl Into<String>) {
        write_lock(&self.message, Some(msg.into()));
        self.broadcast_progress();
    }

    /// Mark the job as completed, storing its return value.
    pub fn complete(&self, result: Option<serde_json::Value>) {
        write_lock(&self.result, result);
        self.finish(JobStatus::Completed);
    }

    /// Mark the job as failed with an error message.
    pub fn fail(&self, error: impl Into<String>) {
        write_lock(&self.message, Some(error.into()));
        self.finish(JobStatus::Failed);
    }

    pub fn cancel(&self) {
        write_lock(&self.message, Some("Cancelled".to_string()));
        self.finish(JobStatus::Cancelled);
    }

    /// When the job reached a terminal status, if it has.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        read_lock(&self.finished_at)
    }

    /// Get a snapshot of the current job state.
    pub fn snapshot(&self) -> JobProgress {
        let finished_at = self.finished_at().map(|t| t.to_rfc3339());
        JobProgress {
            job_id: self.id,
            job_type: self.job_type.clone(),
            status: self.status().as_str().to_string(),
            current: self.current.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            message: read_lock(&self.message),
            result: read_lock(&self.result),
            finished_at,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    fn finish(&self, status: JobStatus) {
        // Status first: a visible finish time implies a terminal status.
        self.status.store(status as u8, Ordering::Release);
        write_lock(&self.finished_at, Some(Utc::now()));
        self.broadcast_progress();
    }

    fn broadcast_progress(&self) {
        // No subscribers is fine.
        let _ = self.progress_tx.send(self.snapshot());
    }
}

fn write_lock<T>(lock: &RwLock<T>, value: T) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(e) => tracing::error!("RwLock poisoned writing job state: {e}"),
    }
}

fn read_lock<T: Clone + Default>(lock: &RwLock<T>) -> T {
    match lock.read() {
        Ok(guard) => guard.clone(),
        Err(e) => {
            tracing::error!("RwLock poisoned reading job state: {e}");
            T::default()
        }
    }
}
