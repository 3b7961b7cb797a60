// crates/server/src/jobs/types.rs
//! Types for the background job system.

use serde::Serialize;

/// Unique identifier for a job.
pub type JobId = u64;

/// Status of a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl JobStatus {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => JobStatus::Pending,
            1 => JobStatus::Running,
            2 => JobStatus::Completed,
            3 => JobStatus::Cancelled,
            _ => JobStatus::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed
        )
    }
}

/// Job snapshot, returned by the jobs API and sent via SSE.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub job_id: JobId,
    pub job_type: String,
    pub status: String,
    pub current: u64,
    pub total: u64,
    pub message: Option<String>,
    /// Task return value once completed.
    pub result: Option<serde_json::Value>,
    pub finished_at: Option<String>,
    pub timestamp: String,
}

/// What a task closure resolves to: an optional JSON result or an error message.
pub type JobOutcome = Result<Option<serde_json::Value>, String>;
