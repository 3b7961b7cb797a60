// crates/core/src/llm/gemini.rs
//! Google Gemini `generateContent` adapter ("gemini").
//!
//! Gemini has no forced tool call here; structured output comes from
//! `responseSchema` with a JSON mime type, and the first candidate's text is
//! the encoded array.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::LlmConfig;
use super::http::{endpoint, post_json, require};
use super::provider::StatusClassifier;
use super::schema::gemini_response_schema;
use super::types::{ClassificationResult, ClassifiedStatus, LlmError, TokenUsage};
use crate::catalog::CategoryCatalog;
use crate::prompt::{build_system_prompt, build_user_prompt};

const PROVIDER: &str = "gemini";
const GEMINI_MODEL: &str = "gemini-2.0-flash-lite";
const GEMINI_TEMPERATURE: f32 = 0.0;
const GEMINI_MAX_TOKENS: u32 = 8_000;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: UsageMetadata,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

impl From<&UsageMetadata> for TokenUsage {
    fn from(usage: &UsageMetadata) -> Self {
        TokenUsage::new()
            .with("prompt_token_count", usage.prompt_token_count)
            .with("candidates_token_count", usage.candidates_token_count)
            .with("total_token_count", usage.total_token_count)
    }
}

pub struct GeminiClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClassifier {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl StatusClassifier for GeminiClassifier {
    async fn classify(
        &self,
        statuses: &[String],
        catalog: &CategoryCatalog,
    ) -> Result<ClassificationResult, LlmError> {
        let api_key = require(&self.config.gemini_api_key, "GEMINI_API_KEY")?;
        let system = build_system_prompt(catalog);
        let user = build_user_prompt(statuses);

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &user }],
            }],
            generation_config: GenerationConfig {
                temperature: GEMINI_TEMPERATURE,
                max_output_tokens: GEMINI_MAX_TOKENS,
                response_mime_type: "application/json",
                response_schema: gemini_response_schema(),
            },
        };

        let url = endpoint(
            &self.config.gemini_base_url,
            &format!("models/{GEMINI_MODEL}:generateContent"),
        );
        let builder = self.client.post(url).header("x-goog-api-key", api_key);
        let response: GenerateResponse = post_json(PROVIDER, builder, &request).await?;

        let tokens_used = TokenUsage::from(&response.usage_metadata);
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| LlmError::InvalidFormat("response contains no candidate text".into()))?;

        let classified_statuses: Vec<ClassifiedStatus> = serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidFormat(format!("candidate text is not a status array: {e}")))?;

        Ok(ClassificationResult {
            classified_statuses,
            tokens_used,
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        GEMINI_MODEL
    }
}
