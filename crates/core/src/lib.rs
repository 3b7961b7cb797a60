// crates/core/src/lib.rs
//! Shipment-status classification: the status catalog, prompt assembly and
//! the LLM provider adapters.

pub mod audit;
pub mod catalog;
pub mod llm;
pub mod prompt;

pub use audit::{audit_classification, AuditFinding};
pub use catalog::{CatalogError, CategoryCatalog};
pub use llm::{
    ClassificationResult, ClassifiedStatus, ClassifierFactory, LlmConfig, LlmError, ProviderKind,
    StatusClassifier, TokenUsage, UnsupportedProvider,
};
