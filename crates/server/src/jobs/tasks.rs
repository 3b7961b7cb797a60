// crates/server/src/jobs/tasks.rs
//! Demo tasks executed on the job runner.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::runner::JobRunner;
use super::types::JobId;

pub const SAMPLE_TASK: &str = "sample_task";
pub const SAY_SOMETHING: &str = "say_something";

/// Arguments of `sample_task`: sleep `a` seconds, then return `b + c`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SampleTaskArgs {
    pub a: u64,
    pub b: i64,
    pub c: i64,
}

pub async fn sample_task(args: SampleTaskArgs) -> i64 {
    tracing::info!("Running sample task...");
    tokio::time::sleep(Duration::from_secs(args.a)).await;
    tracing::info!("End sample task...");
    args.b.saturating_add(args.c)
}

/// Log `"<local time> <msg>"`, falling back to "Hello" for a missing or
/// empty message. Returns the logged line.
pub fn say_something(msg: Option<&str>) -> String {
    let msg = msg.filter(|m| !m.is_empty()).unwrap_or("Hello");
    let line = format!("{} {}", chrono::Local::now().naive_local(), msg);
    tracing::info!("{line}");
    line
}

pub fn spawn_sample_task(runner: &Arc<JobRunner>, args: SampleTaskArgs) -> JobId {
    runner.start_job(SAMPLE_TASK, 1, move |state| async move {
        state.set_message("Running sample task...");
        let sum = sample_task(args).await;
        state.increment();
        state.set_message("End sample task...");
        Ok(Some(json!(sum)))
    })
}

pub fn spawn_say_something(runner: &Arc<JobRunner>, msg: Option<String>) -> JobId {
    runner.start_job(SAY_SOMETHING, 1, move |state| async move {
        let line = say_something(msg.as_deref());
        state.increment();
        Ok(Some(json!(line)))
    })
}
