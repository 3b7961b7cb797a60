// crates/server/src/jobs/mod.rs
//! Background job system for the demo tasks.
//!
//! Provides:
//! - `JobRunner`: central manager for spawning, tracking and pruning jobs
//! - `JobState`: atomic progress tracking per job
//! - `JobProgress`: SSE-compatible job snapshots
//! - `Scheduler`: periodic `say_something` runs
//! - `tasks`: `sample_task` and `say_something`

pub mod runner;
pub mod scheduler;
pub mod state;
pub mod tasks;
pub mod types;

pub use runner::JobRunner;
pub use scheduler::Scheduler;
pub use state::JobState;
pub use tasks::SampleTaskArgs;
pub use types::{JobId, JobOutcome, JobProgress, JobStatus};
