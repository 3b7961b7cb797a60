// crates/core/src/llm/openai.rs
//! OpenAI chat-completions adapter ("gpt") and the wire types shared with the
//! fine-tuned adapter.

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

pub(crate) const PROVIDER: &str = "openai";
const GPT_MODEL: &str = "gpt-4o-mini";
const GPT_TEMPERATURE: f32 = 0.1;
const GPT_MAX_TOKENS: u32 = 10_000;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub tools: Vec<Value>,
    pub tool_choice: Value,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseMessage {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionCall {
    /// JSON-encoded arguments, as a string.
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl From<&ChatUsage> for TokenUsage {
    fn from(usage: &ChatUsage) -> Self {
        TokenUsage::new()
            .with("prompt_tokens", usage.prompt_tokens)
            .with("completion_tokens", usage.completion_tokens)
            .with("total_tokens", usage.total_tokens)
    }
}

/// Function tool definition with a forced `tool_choice`.
pub(crate) fn function_tool(name: &str, description: &str, parameters: Value) -> (Value, Value) {
    let tool = json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": parameters,
        },
    });
    let choice = json!({ "type": "function", "function": { "name": name } });
    (tool, choice)
}

/// POST a chat completion and return the first tool call's raw arguments.
pub(crate) async fn call_tool(
    client: &reqwest::Client,
    config: &LlmConfig,
    request: &ChatRequest<'_>,
) -> Result<(String, TokenUsage), LlmError> {
    let api_key = require(&config.openai_api_key, "OPENAI_API_KEY")?;
    let url = endpoint(&config.openai_base_url, "chat/completions");

    let response: ChatResponse =
        post_json(PROVIDER, client.post(url).bearer_auth(api_key), request).await?;

    let usage = TokenUsage::from(&response.usage);
    let arguments = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.tool_calls.into_iter().next())
        .map(|call| call.function.arguments)
        .ok_or_else(|| LlmError::InvalidFormat("response contains no tool call".to_string()))?;

    Ok((arguments, usage))
}

// ============================================================================
// Batching adapter
// ============================================================================

#[derive(Debug, Deserialize)]
struct BatchArguments {
    classified_statuses: Vec<ClassifiedStatus>,
}

/// Classifies a whole batch with one `gpt-4o-mini` function call.
pub struct GptClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GptClassifier {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl StatusClassifier for GptClassifier {
    async fn classify(
        &self,
        statuses: &[String],
        catalog: &CategoryCatalog,
    ) -> Result<ClassificationResult, LlmError> {
        let system = build_system_prompt(catalog);
        let user = build_user_prompt(statuses);
        let (tool, tool_choice) =
            function_tool(BATCH_TOOL_NAME, BATCH_TOOL_DESCRIPTION, batch_arguments_schema());

        let request = ChatRequest {
            model: GPT_MODEL,
            messages: vec![
                ChatMessage { role: "system", content: &system },
                ChatMessage { role: "user", content: &user },
            ],
            tools: vec![tool],
            tool_choice,
            temperature: GPT_TEMPERATURE,
            max_tokens: GPT_MAX_TOKENS,
        };

        let (arguments, tokens_used) = call_tool(&self.client, &self.config, &request).await?;
        let parsed: BatchArguments = serde_json::from_str(&arguments).map_err(|e| {
            LlmError::InvalidFormat(format!("tool arguments missing required fields: {e}"))
        })?;

        Ok(ClassificationResult {
            classified_statuses: parsed.classified_statuses,
            tokens_used,
        })
    }

    fn name(&self) -> &str {
        "gpt"
    }

    fn model(&self) -> &str {
        GPT_MODEL
    }
}
