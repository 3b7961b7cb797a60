// crates/server/src/jobs/runner.rs
//! Central job runner that manages all background jobs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, oneshot};

use super::state::JobState;
use super::types::{JobId, JobOutcome, JobProgress};
use crate::metrics::record_job_finished;

/// Central job runner that manages all background jobs.
///
/// Thread-safe via `Arc` wrapping. Call `start_job` to spawn async work
/// with progress tracking, and `subscribe` to get SSE-compatible updates.
/// Finished jobs stay queryable until `prune_finished` drops them.
pub struct JobRunner {
    next_id: AtomicU64,
    jobs: RwLock<HashMap<JobId, Arc<JobState>>>,
    cancels: Mutex<HashMap<JobId, oneshot::Sender<()>>>,
    global_tx: broadcast::Sender<JobProgress>,
}

impl JobRunner {
    /// Create a new job runner.
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(256);
        Self {
            next_id: AtomicU64::new(1),
            jobs: RwLock::new(HashMap::new()),
            cancels: Mutex::new(HashMap::new()),
            global_tx,
        }
    }

    /// Start a new background job and return its id.
    ///
    /// The closure receives the job's `Arc<JobState>` for progress
    /// reporting. A cancelled job's future is dropped at its next await.
    pub fn start_job<F, Fut>(
        self: &Arc<Self>,
        job_type: impl Into<String>,
        total: u64,
        f: F,
    ) -> JobId
    where
        F: FnOnce(Arc<JobState>) -> Fut + Send + 'static,
        Fut: Future<Output = JobOutcome> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(JobState::new(
            id,
            job_type.into(),
            total,
            self.global_tx.clone(),
        ));

        match self.jobs.write() {
            Ok(mut jobs) => {
                jobs.insert(id, Arc::clone(&state));
            }
            Err(e) => tracing::error!("RwLock poisoned writing jobs map: {e}"),
        }

        let (cancel_tx, cancel_rx) = oneshot::channel();
        if let Ok(mut cancels) = self.cancels.lock() {
            cancels.insert(id, cancel_tx);
        }

        let runner = Arc::clone(self);
        tokio::spawn(async move {
            state.set_running();
            tracing::debug!(job_id = id, job_type = state.job_type(), "Job started");

            tokio::select! {
                outcome = f(Arc::clone(&state)) => match outcome {
                    Ok(result) => state.complete(result),
                    Err(e) => {
                        tracing::warn!(job_id = id, job_type = state.job_type(), error = %e, "Job failed");
                        state.fail(e);
                    }
                },
                Ok(()) = cancel_rx => state.cancel(),
            }

            if let Ok(mut cancels) = runner.cancels.lock() {
                cancels.remove(&id);
            }
            let status = state.status();
            record_job_finished(state.job_type(), status.as_str());
            tracing::debug!(job_id = id, status = status.as_str(), "Job finished");
        });

        id
    }

    /// Subscribe to all job progress updates (for SSE streaming).
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgress> {
        self.global_tx.subscribe()
    }

    /// Get current status of a specific job.
    pub fn get_job(&self, id: JobId) -> Option<JobProgress> {
        match self.jobs.read() {
            Ok(jobs) => jobs.get(&id).map(|s| s.snapshot()),
            Err(e) => {
                tracing::error!("RwLock poisoned reading jobs map: {e}");
                None
            }
        }
    }

    /// Get all active (pending or running) jobs, oldest first.
    pub fn active_jobs(&self) -> Vec<JobProgress> {
        match self.jobs.read() {
            Ok(jobs) => {
                let mut active: Vec<_> = jobs
                    .values()
                    .filter(|s| !s.status().is_finished())
                    .map(|s| s.snapshot())
                    .collect();
                active.sort_by_key(|p| p.job_id);
                active
            }
            Err(e) => {
                tracing::error!("RwLock poisoned reading jobs: {e}");
                Vec::new()
            }
        }
    }

    /// Signal a running job to stop. Returns `false` if it is unknown or
    /// already finished.
    pub fn cancel(&self, id: JobId) -> bool {
        let sender = self.cancels.lock().ok().and_then(|mut c| c.remove(&id));
        sender.is_some_and(|tx| tx.send(()).is_ok())
    }

    /// Cancel every job still in flight. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let senders: Vec<_> = match self.cancels.lock() {
            Ok(mut cancels) => cancels.drain().map(|(_, tx)| tx).collect(),
            Err(_) => Vec::new(),
        };
        senders
            .into_iter()
            .map(|tx| tx.send(()))
            .filter(Result::is_ok)
            .count()
    }

    /// Drop finished jobs whose finish time is at least `ttl` ago.
    /// Returns the number removed.
    pub fn prune_finished(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let now = Utc::now();
        match self.jobs.write() {
            Ok(mut jobs) => {
                let before = jobs.len();
                jobs.retain(|_, s| match s.finished_at() {
                    Some(at) => now - at < ttl,
                    None => true,
                });
                before - jobs.len()
            }
            Err(e) => {
                tracing::error!("RwLock poisoned pruning jobs: {e}");
                0
            }
        }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn wait_finished(runner: &JobRunner, id: JobId) -> JobProgress {
        for _ in 0..100 {
            if let Some(p) = runner.get_job(id) {
                if p.finished_at.is_some() {
                    return p;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} did not finish");
    }

    #[tokio::test]
    async fn test_job_runner_start_and_complete() {
        let runner = Arc::new(JobRunner::new());

        let id = runner.start_job("test", 10, |state| async move {
            for _ in 0..10 {
                state.increment();
            }
            Ok(Some(json!("done")))
        });

        let progress = wait_finished(&runner, id).await;
        assert_eq!(progress.status, "completed");
        assert_eq!(progress.current, 10);
        assert_eq!(progress.result, Some(json!("done")));
    }

    #[tokio::test]
    async fn test_job_runner_failure() {
        let runner = Arc::new(JobRunner::new());

        let id = runner.start_job("test", 5, |_state| async move {
            Err("something went wrong".to_string())
        });

        let progress = wait_finished(&runner, id).await;
        assert_eq!(progress.status, "failed");
        assert_eq!(progress.message.as_deref(), Some("something went wrong"));
    }

    #[tokio::test]
    async fn test_job_runner_cancellation() {
        let runner = Arc::new(JobRunner::new());

        let id = runner.start_job("test", 100, |state| async move {
            loop {
                state.increment();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(runner.cancel(id));

        let progress = wait_finished(&runner, id).await;
        assert_eq!(progress.status, "cancelled");
        assert!(!runner.cancel(id));
    }

    #[tokio::test]
    async fn test_cancel_all_stops_in_flight_jobs() {
        let runner = Arc::new(JobRunner::new());
        let slow = |_state: Arc<JobState>| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            JobOutcome::Ok(None)
        };
        let a = runner.start_job("slow", 1, slow);
        let b = runner.start_job("slow", 1, slow);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(runner.cancel_all(), 2);
        assert_eq!(wait_finished(&runner, a).await.status, "cancelled");
        assert_eq!(wait_finished(&runner, b).await.status, "cancelled");
    }

    #[tokio::test]
    async fn test_job_runner_active_jobs() {
        let runner = Arc::new(JobRunner::new());

        runner.start_job("test", 100, |_state| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(None)
        });

        tokio::time::sleep(Duration::from_millis(50)).await;

        let active = runner.active_jobs();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].job_type, "test");
        runner.cancel_all();
    }

    #[tokio::test]
    async fn test_prune_finished_keeps_running_jobs() {
        let runner = Arc::new(JobRunner::new());
        let done = runner.start_job("quick", 1, |_state| async move { Ok(None) });
        let running = runner.start_job("slow", 1, |_state| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(None)
        });
        wait_finished(&runner, done).await;

        assert_eq!(runner.prune_finished(Duration::from_secs(3600)), 0);
        assert_eq!(runner.prune_finished(Duration::ZERO), 1);
        assert!(runner.get_job(done).is_none());
        assert!(runner.get_job(running).is_some());
        runner.cancel_all();
    }

    #[tokio::test]
    async fn test_job_runner_subscribe() {
        let runner = Arc::new(JobRunner::new());
        let mut rx = runner.subscribe();

        runner.start_job("test", 5, |state| async move {
            state.increment();
            Ok(None)
        });

        let progress = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timeout waiting for progress")
            .expect("channel error");

        assert_eq!(progress.job_type, "test");
    }

    #[test]
    fn test_job_runner_default() {
        let runner = JobRunner::default();
        assert!(runner.active_jobs().is_empty());
    }
}
