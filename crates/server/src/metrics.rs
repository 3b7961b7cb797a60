//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Metric definitions (counters, histograms)
//! - Helper functions for recording classification metrics

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use parcelwise_core::TokenUsage;
use std::sync::OnceLock;
use std::time::Duration;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// This should be called once at application startup, before any metrics are recorded.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        return false;
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return false;
    }

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Failed to store Prometheus handle (already set)");
    }

    describe_metrics();

    tracing::info!("Prometheus metrics initialized");
    true
}

fn describe_metrics() {
    describe_counter!(
        "classification_requests_total",
        "Status classification requests by provider and outcome"
    );
    describe_counter!(
        "classification_tokens_total",
        "Tokens reported by LLM vendors, by provider and usage dimension"
    );
    describe_histogram!(
        "classification_duration_seconds",
        "Duration of LLM classification calls in seconds"
    );
    describe_counter!("jobs_finished_total", "Background jobs finished, by type and status");
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Record one classification call.
///
/// `outcome` is "ok", "unsupported" or "error".
pub fn record_classification(provider: &str, outcome: &'static str, duration: Duration) {
    counter!(
        "classification_requests_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("classification_duration_seconds", "provider" => provider.to_string())
        .record(duration.as_secs_f64());
}

/// Add vendor-reported token counts, one series per usage key.
pub fn record_tokens(provider: &str, usage: &TokenUsage) {
    for (kind, count) in usage.iter() {
        counter!(
            "classification_tokens_total",
            "provider" => provider.to_string(),
            "kind" => kind.to_string()
        )
        .increment(count);
    }
}

pub fn record_job_finished(job_type: &str, status: &str) {
    counter!(
        "jobs_finished_total",
        "job_type" => job_type.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        // Only checks the helpers never panic, whether or not another test
        // installed the global recorder first.
        record_classification("gpt", "ok", Duration::from_millis(5));
        record_tokens("gpt", &TokenUsage::new().with("prompt_tokens", 3));
        record_job_finished("sample_task", "completed");
    }

    #[test]
    fn test_init_then_render() {
        init_metrics();
        record_classification("claude", "error", Duration::from_millis(1));
        let output = render_metrics().expect("initialized");
        assert!(output.contains("classification_requests_total"));
    }
}
