// crates/core/src/llm/provider.rs
//! StatusClassifier trait defining the interface for LLM integrations.

use async_trait::async_trait;

use super::types::{ClassificationResult, LlmError};
use crate::catalog::CategoryCatalog;

/// A vendor-backed classifier for batches of shipment statuses.
///
/// Implementations hold only an HTTP client handle and configuration, so one
/// instance can serve concurrent requests. They return exactly what the
/// vendor produced: result length and catalog validity are not enforced here.
#[async_trait]
pub trait StatusClassifier: Send + Sync {
    /// Classify `statuses` (1..=100 entries) against `catalog`.
    async fn classify(
        &self,
        statuses: &[String],
        catalog: &CategoryCatalog,
    ) -> Result<ClassificationResult, LlmError>;

    /// Provider id as accepted by the factory (e.g. "gpt", "claude").
    fn name(&self) -> &str;

    /// Model identifier sent to the vendor.
    fn model(&self) -> &str;
}
