// crates/server/src/jobs/scheduler.rs
//! Periodic demo tasks and job-record pruning.
//!
//! - `say_something("Holla!")` every 5 seconds
//! - `say_something("Uh oh! Hotdog!")` at the start of every minute
//! - finished jobs older than the result TTL are pruned on the 5s tick

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::runner::JobRunner;
use super::tasks::spawn_say_something;

pub const INTERVAL_MESSAGE: &str = "Holla!";
pub const MINUTE_MESSAGE: &str = "Uh oh! Hotdog!";
const INTERVAL: Duration = Duration::from_secs(5);

pub struct Scheduler {
    runner: Arc<JobRunner>,
    result_ttl: Duration,
}

impl Scheduler {
    pub fn new(runner: Arc<JobRunner>, result_ttl: Duration) -> Self {
        Self { runner, result_ttl }
    }

    /// Run until `shutdown` resolves.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tracing::info!(
            interval_secs = INTERVAL.as_secs(),
            result_ttl_secs = self.result_ttl.as_secs(),
            "Scheduler started"
        );

        let mut every_five = interval_at(Instant::now() + INTERVAL, INTERVAL);
        every_five.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            let next_minute = tokio::time::sleep(until_next_minute(Utc::now()));
            tokio::select! {
                _ = &mut shutdown => break,
                _ = every_five.tick() => {
                    spawn_say_something(&self.runner, Some(INTERVAL_MESSAGE.to_string()));
                    let pruned = self.runner.prune_finished(self.result_ttl);
                    if pruned > 0 {
                        tracing::debug!(pruned, "Pruned finished jobs");
                    }
                }
                _ = next_minute => {
                    spawn_say_something(&self.runner, Some(MINUTE_MESSAGE.to_string()));
                }
            }
        }

        tracing::info!("Scheduler stopped");
    }
}

/// Time left until the next whole minute (never zero, so a tick that lands
/// exactly on the boundary does not fire twice).
pub fn until_next_minute(now: DateTime<Utc>) -> Duration {
    // nanosecond() exceeds 1e9 during a leap second.
    let nanos = u64::from(now.nanosecond() % 1_000_000_000);
    let into_minute = Duration::from_secs(u64::from(now.second())) + Duration::from_nanos(nanos);
    Duration::from_secs(60)
        .saturating_sub(into_minute)
        .max(Duration::from_millis(1))
}
