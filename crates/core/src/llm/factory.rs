// crates/core/src/llm/factory.rs
//! Classifier factory: maps a provider name onto a fresh adapter.

use std::fmt;
use std::str::FromStr;

use super::anthropic::ClaudeClassifier;
use super::config::LlmConfig;
use super::ft_openai::FineTunedGptClassifier;
use super::gemini::GeminiClassifier;
use super::http::build_client;
use super::openai::GptClassifier;
use super::provider::StatusClassifier;
use super::types::LlmError;

/// Raised for a provider name outside the known set. Carries the
/// lower-cased name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("LLM '{name}' is not implemented for status classification. Please use a supported model.")]
pub struct UnsupportedProvider {
    pub name: String,
}

/// The closed set of supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gpt,
    FineTunedGpt,
    Claude,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gpt,
        ProviderKind::FineTunedGpt,
        ProviderKind::Claude,
        ProviderKind::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gpt => "gpt",
            ProviderKind::FineTunedGpt => "ft-gpt",
            ProviderKind::Claude => "claude",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Names accepted besides [`as_str`](Self::as_str).
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::FineTunedGpt => &["fine-tuned-gpt"],
            _ => &[],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = UnsupportedProvider;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name || kind.aliases().contains(&name.as_str()))
            .ok_or(UnsupportedProvider { name })
    }
}

/// Builds adapters over one shared HTTP client and configuration.
#[derive(Debug, Clone)]
pub struct ClassifierFactory {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ClassifierFactory {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    /// Build the shared client from `config.timeout_secs`.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self::new(client, config))
    }

    /// Resolve `name` (case-insensitive) to a new adapter instance.
    pub fn get_classifier(
        &self,
        name: &str,
    ) -> Result<Box<dyn StatusClassifier>, UnsupportedProvider> {
        let kind: ProviderKind = name.parse()?;
        Ok(self.create(kind))
    }

    pub fn create(&self, kind: ProviderKind) -> Box<dyn StatusClassifier> {
        let client = self.client.clone();
        let config = self.config.clone();
        match kind {
            ProviderKind::Gpt => Box::new(GptClassifier::new(client, config)),
            ProviderKind::FineTunedGpt => Box::new(FineTunedGptClassifier::new(client, config)),
            ProviderKind::Claude => Box::new(ClaudeClassifier::new(client, config)),
            ProviderKind::Gemini => Box::new(GeminiClassifier::new(client, config)),
        }
    }
}
