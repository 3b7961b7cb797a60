// crates/core/src/llm/ft_openai.rs
//! Fine-tuned OpenAI adapter ("ft-gpt").
//!
//! Unlike the batching adapters this one issues one chat completion per
//! status, sequentially and in input order, and sums every usage dimension
//! across the calls.

use async_trait::async_trait;

use super::config::LlmConfig;
use super::http::require;
use super::openai::{call_tool, function_tool, ChatMessage, ChatRequest};
use super::provider::StatusClassifier;
use super::schema::{classified_status_schema, SINGLE_TOOL_DESCRIPTION, SINGLE_TOOL_NAME};
use super::types::{ClassificationResult, ClassifiedStatus, LlmError, TokenUsage};
use crate::catalog::CategoryCatalog;
use crate::prompt::{build_pair_system_prompt, build_single_user_prompt};

const FT_TEMPERATURE: f32 = 0.0;
const FT_MAX_TOKENS: u32 = 10_000;

pub struct FineTunedGptClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl FineTunedGptClassifier {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    async fn classify_one(
        &self,
        model: &str,
        system: &str,
        status: &str,
    ) -> Result<(ClassifiedStatus, TokenUsage), LlmError> {
        let user = build_single_user_prompt(status);
        let (tool, tool_choice) =
            function_tool(SINGLE_TOOL_NAME, SINGLE_TOOL_DESCRIPTION, classified_status_schema());

        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: &user },
            ],
            tools: vec![tool],
            tool_choice,
            temperature: FT_TEMPERATURE,
            max_tokens: FT_MAX_TOKENS,
        };

        let (arguments, usage) = call_tool(&self.client, &self.config, &request).await?;
        let classified = serde_json::from_str(&arguments).map_err(|e| {
            LlmError::InvalidFormat(format!("tool arguments missing required fields: {e}"))
        })?;
        Ok((classified, usage))
    }
}

#[async_trait]
impl StatusClassifier for FineTunedGptClassifier {
    async fn classify(
        &self,
        statuses: &[String],
        catalog: &CategoryCatalog,
    ) -> Result<ClassificationResult, LlmError> {
        let model = require(&self.config.openai_fine_tuned_model, "OPENAI_FINE_TUNED_MODEL")?;
        let system = build_pair_system_prompt(catalog);

        let mut classified_statuses = Vec::with_capacity(statuses.len());
        let mut tokens_used = TokenUsage::new();
        for (i, status) in statuses.iter().enumerate() {
            let (classified, usage) = self.classify_one(model, &system, status).await?;
            tracing::debug!(index = i, total = statuses.len(), "ft-gpt: status classified");
            classified_statuses.push(classified);
            tokens_used.accumulate(&usage);
        }

        Ok(ClassificationResult {
            classified_statuses,
            tokens_used,
        })
    }

    fn name(&self) -> &str {
        "ft-gpt"
    }

    fn model(&self) -> &str {
        self.config
            .openai_fine_tuned_model
            .as_deref()
            .unwrap_or("<unset>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            openai_api_key: Some("sk-test".into()),
            openai_fine_tuned_model: Some("ft:gpt-4o-mini:acme::status".into()),
            ..LlmConfig::default()
        }
        .with_base_url(server.uri())
    }

    fn single_response(status_name: &str) -> ResponseTemplate {
        let arguments = json!({
            "status_name": status_name,
            "status_type": "Exception",
            "substatus_type": "Cancelled",
        });
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": { "name": "classify_status", "arguments": arguments.to_string() }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
    }

    #[tokio::test]
    async fn test_one_call_per_status_and_usage_summed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "ft:gpt-4o-mini:acme::status",
                "tool_choice": { "function": { "name": "classify_status" } },
            })))
            .respond_with(single_response("shipment has been cancelled"))
            .expect(3)
            .mount(&server)
            .await;

        let classifier = FineTunedGptClassifier::new(reqwest::Client::new(), config_for(&server));
        let statuses = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = classifier
            .classify(&statuses, &CategoryCatalog::shipment_default())
            .await
            .unwrap();

        assert_eq!(result.classified_statuses.len(), 3);
        assert_eq!(result.tokens_used.get("prompt_tokens"), Some(30));
        assert_eq!(result.tokens_used.get("completion_tokens"), Some(15));
        assert_eq!(result.tokens_used.get("total_tokens"), Some(45));
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let server = MockServer::start().await;
        let statuses: Vec<String> = ["out for delivery", "customs hold", "returned to sender", "delivered"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for status in &statuses {
            Mock::given(method("POST"))
                .and(path("/chat/completions"))
                .and(body_partial_json(json!({
                    "messages": [
                        {"role": "system"},
                        {"role": "user", "content": format!("Classify the status: `{status}`")},
                    ]
                })))
                .respond_with(single_response(status))
                .expect(1)
                .mount(&server)
                .await;
        }

        let classifier = FineTunedGptClassifier::new(reqwest::Client::new(), config_for(&server));
        let result = classifier
            .classify(&statuses, &CategoryCatalog::shipment_default())
            .await
            .unwrap();

        let names: Vec<&str> = result
            .classified_statuses
            .iter()
            .map(|c| c.status_name.as_str())
            .collect();
        assert_eq!(names, statuses.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(result.tokens_used.get("total_tokens"), Some(60));
    }

    #[tokio::test]
    async fn test_single_status_matches_vendor_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "Classify the status: `shipment has been cancelled`"},
                ]
            })))
            .respond_with(single_response("shipment has been cancelled"))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = CategoryCatalog::from_json(r#"{"Exception": ["Cancelled"]}"#).unwrap();
        let classifier = FineTunedGptClassifier::new(reqwest::Client::new(), config_for(&server));
        let result = classifier
            .classify(&["shipment has been cancelled".to_string()], &catalog)
            .await
            .unwrap();

        assert_eq!(
            result.classified_statuses,
            vec![ClassifiedStatus {
                status_name: "shipment has been cancelled".into(),
                status_type: "Exception".into(),
                substatus_type: Some("Cancelled".into()),
            }]
        );
        assert_eq!(
            serde_json::to_value(&result.tokens_used).unwrap(),
            json!({"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15})
        );
    }

    #[tokio::test]
    async fn test_missing_fine_tuned_model() {
        let config = LlmConfig {
            openai_api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        };
        let classifier = FineTunedGptClassifier::new(reqwest::Client::new(), config);
        let err = classifier
            .classify(&["x".to_string()], &CategoryCatalog::shipment_default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_FINE_TUNED_MODEL"));
    }

    #[tokio::test]
    async fn test_failure_mid_batch_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let classifier = FineTunedGptClassifier::new(reqwest::Client::new(), config_for(&server));
        let statuses = vec!["a".to_string(), "b".to_string()];
        let err = classifier
            .classify(&statuses, &CategoryCatalog::shipment_default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }
}
