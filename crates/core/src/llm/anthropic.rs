// crates/core/src/llm/anthropic.rs
//! Anthropic Messages API adapter ("claude").

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::config::LlmConfig;
use super::http::{endpoint, post_json, require};
use super::provider::StatusClassifier;
use super::schema::{batch_arguments_schema, BATCH_TOOL_DESCRIPTION, BATCH_TOOL_NAME};
use super::types::{ClassificationResult, ClassifiedStatus, LlmError, TokenUsage};
use crate::catalog::CategoryCatalog;
use crate::prompt::{build_system_prompt, build_user_prompt};

const PROVIDER: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const CLAUDE_MODEL: &str = "claude-3-5-haiku-20241022";
const CLAUDE_TEMPERATURE: f32 = 0.0;
const CLAUDE_MAX_TOKENS: u32 = 8_000;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message<'a>>,
    tools: Vec<Value>,
    tool_choice: Value,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: MessagesUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse { input: ToolInput },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ToolInput {
    classified_statuses: Vec<ClassifiedStatus>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u64,
    output_tokens: u64,
}

impl From<&MessagesUsage> for TokenUsage {
    fn from(usage: &MessagesUsage) -> Self {
        TokenUsage::new()
            .with("input_tokens", usage.input_tokens)
            .with("output_tokens", usage.output_tokens)
            .with("total_tokens", usage.input_tokens + usage.output_tokens)
    }
}

pub struct ClaudeClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ClaudeClassifier {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl StatusClassifier for ClaudeClassifier {
    async fn classify(
        &self,
        statuses: &[String],
        catalog: &CategoryCatalog,
    ) -> Result<ClassificationResult, LlmError> {
        let api_key = require(&self.config.anthropic_api_key, "ANTHROPIC_API_KEY")?;
        let system = build_system_prompt(catalog);
        let user = build_user_prompt(statuses);

        let request = MessagesRequest {
            model: CLAUDE_MODEL,
            system: &system,
            messages: vec![Message { role: "user", content: &user }],
            tools: vec![json!({
                "name": BATCH_TOOL_NAME,
                "description": BATCH_TOOL_DESCRIPTION,
                "input_schema": batch_arguments_schema(),
            })],
            tool_choice: json!({ "type": "tool", "name": BATCH_TOOL_NAME }),
            temperature: CLAUDE_TEMPERATURE,
            max_tokens: CLAUDE_MAX_TOKENS,
        };

        let url = endpoint(&self.config.anthropic_base_url, "messages");
        let builder = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let response: MessagesResponse = post_json(PROVIDER, builder, &request).await?;

        let tokens_used = TokenUsage::from(&response.usage);
        let classified_statuses = response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { input } => Some(input.classified_statuses),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| LlmError::InvalidFormat("response contains no tool_use block".into()))?;

        Ok(ClassificationResult {
            classified_statuses,
            tokens_used,
        })
    }

    fn name(&self) -> &str {
        "claude"
    }

    fn model(&self) -> &str {
        CLAUDE_MODEL
    }
}
