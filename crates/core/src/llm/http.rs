// crates/core/src/llm/http.rs
//! Shared HTTP plumbing for the vendor adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::LlmError;

/// Build the shared vendor client. `reqwest::Client` is internally
/// reference-counted, so adapters clone it freely.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(LlmError::http("http-client"))
}

/// POST `body` as JSON and decode a successful response as `R`.
///
/// Non-2xx responses become `LlmError::Api` carrying the vendor's body text.
pub(crate) async fn post_json<B, R>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<R, LlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let t0 = std::time::Instant::now();
    let response = request
        .json(body)
        .send()
        .await
        .map_err(LlmError::http(provider))?;

    let status = response.status();
    let elapsed_ms = t0.elapsed().as_millis() as u64;
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!(
            provider,
            status = status.as_u16(),
            elapsed_ms,
            body = %preview(&message),
            "LLM vendor returned an error"
        );
        return Err(LlmError::Api {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    let text = response.text().await.map_err(LlmError::http(provider))?;
    tracing::debug!(provider, elapsed_ms, body_len = text.len(), "LLM vendor responded");
    serde_json::from_str(&text).map_err(|e| {
        tracing::warn!(provider, body = %preview(&text), "LLM vendor returned unexpected JSON");
        LlmError::ParseFailed(format!("{provider} response: {e}"))
    })
}

/// First 500 characters of a vendor body, for logs.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Require a configured secret, naming the env var when it is missing.
pub(crate) fn require<'a>(value: &'a Option<String>, env_var: &str) -> Result<&'a str, LlmError> {
    value
        .as_deref()
        .ok_or_else(|| LlmError::NotConfigured(format!("{env_var} is not set")))
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
