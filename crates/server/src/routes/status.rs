// crates/server/src/routes/status.rs
//! Shipment-status classification endpoint.
//!
//! POST /status/classify runs a batch of raw carrier statuses through the
//! requested LLM provider and returns the classified batch with token usage.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use parcelwise_core::{audit_classification, ClassificationResult};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_classification, record_tokens};
use crate::state::AppState;

/// Largest batch accepted in one request.
pub const MAX_STATUSES: usize = 100;

/// Provider used when the request names none.
pub const DEFAULT_PROVIDER: &str = "gpt";

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub statuses: Vec<String>,
    #[serde(default)]
    pub llm: Option<String>,
}

impl ClassifyRequest {
    /// Requested provider. A missing or all-blank name means the default;
    /// any other name goes to the factory untrimmed.
    fn provider(&self) -> &str {
        self.llm
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_PROVIDER)
    }
}

/// POST /status/classify
async fn classify_statuses(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ClassifyRequest>, JsonRejection>,
) -> ApiResult<Json<ClassificationResult>> {
    let Json(request) = body?;
    let count = request.statuses.len();
    if count == 0 || count > MAX_STATUSES {
        return Err(ApiError::Validation(format!(
            "statuses must contain between 1 and {MAX_STATUSES} items, got {count}"
        )));
    }

    let started = Instant::now();
    let classifier = match state.classifiers.get_classifier(request.provider()) {
        Ok(classifier) => classifier,
        Err(e) => {
            // Unknown names are not used as labels.
            record_classification("unknown", "unsupported", started.elapsed());
            return Err(e.into());
        }
    };
    let provider = classifier.name().to_string();

    tracing::info!(
        provider = %provider,
        model = classifier.model(),
        statuses = count,
        "Classifying statuses"
    );

    match classifier.classify(&request.statuses, &state.catalog).await {
        Ok(result) => {
            let elapsed = started.elapsed();
            record_classification(&provider, "ok", elapsed);
            record_tokens(&provider, &result.tokens_used);
            let findings =
                audit_classification(&provider, &request.statuses, &result, &state.catalog);
            tracing::info!(
                provider = %provider,
                elapsed_ms = elapsed.as_millis() as u64,
                findings = findings.len(),
                "Classification finished"
            );
            Ok(Json(result))
        }
        Err(e) => {
            record_classification(&provider, "error", started.elapsed());
            Err(e.into())
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/status/classify", post(classify_statuses))
}
