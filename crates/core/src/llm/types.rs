// crates/core/src/llm/types.rs
//! Request/response/error types for status classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One classified status as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedStatus {
    pub status_name: String,
    pub status_type: String,
    #[serde(default)]
    pub substatus_type: Option<String>,
}

/// Token usage reported by a provider, keyed by the vendor's own field names
/// (`prompt_tokens`, `input_tokens`, `prompt_token_count`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenUsage(BTreeMap<String, u64>);

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one usage dimension, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, count: u64) -> Self {
        self.0.insert(key.into(), count);
        self
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    /// Add every dimension of `other` into `self`.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        for (key, count) in &other.0 {
            *self.0.entry(key.clone()).or_insert(0) += count;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Classified statuses for a whole batch plus the batch's token usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classified_statuses: Vec<ClassifiedStatus>,
    pub tokens_used: TokenUsage,
}

/// Errors that can occur while calling a provider or decoding its answer.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseFailed(String),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    pub(crate) fn http(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { provider, source }
    }
}
