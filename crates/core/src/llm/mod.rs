// crates/core/src/llm/mod.rs
//! LLM integration for shipment status classification.
//!
//! Provides the `StatusClassifier` trait, one adapter per vendor, and the
//! factory that selects an adapter by provider name.

pub mod anthropic;
pub mod config;
pub mod factory;
pub mod ft_openai;
pub mod gemini;
mod http;
pub mod openai;
pub mod provider;
pub mod schema;
pub mod types;

pub use anthropic::ClaudeClassifier;
pub use config::LlmConfig;
pub use factory::{ClassifierFactory, ProviderKind, UnsupportedProvider};
pub use ft_openai::FineTunedGptClassifier;
pub use gemini::GeminiClassifier;
pub use http::build_client;
pub use openai::GptClassifier;
pub use provider::StatusClassifier;
pub use types::{ClassificationResult, ClassifiedStatus, LlmError, TokenUsage};
