// crates/core/src/llm/schema.rs
//! Structured-output schemas shared by the provider adapters.

use serde_json::{json, Value};

/// Tool name for the batching adapters.
pub const BATCH_TOOL_NAME: &str = "classify_statuses";
pub const BATCH_TOOL_DESCRIPTION: &str =
    "Get an array of statuses classified by status type and substatus type";

/// Tool name for the one-status-per-call adapter.
pub const SINGLE_TOOL_NAME: &str = "classify_status";
pub const SINGLE_TOOL_DESCRIPTION: &str =
    "Get the status classified by status type and substatus type";

/// JSON schema of one classified status (JSON Schema dialect used by the
/// OpenAI and Anthropic tool definitions).
pub fn classified_status_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "status_name": {
                "type": "string",
                "description": "Name of status",
            },
            "status_type": {
                "type": "string",
                "description": "Status type of status",
            },
            "substatus_type": {
                "type": ["string", "null"],
                "description": "Substatus type of status",
            },
        },
        "required": ["status_name", "status_type"],
    })
}

/// Schema of the batch tool arguments: `{"classified_statuses": [...]}`.
pub fn batch_arguments_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "classified_statuses": {
                "type": "array",
                "items": classified_status_schema(),
            },
        },
        "required": ["classified_statuses"],
    })
}

/// Gemini response schema (OpenAPI subset): an array of classified statuses.
pub fn gemini_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "status_name": { "type": "STRING" },
                "status_type": { "type": "STRING" },
                "substatus_type": { "type": "STRING", "nullable": true },
            },
            "required": ["status_name", "status_type"],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_schema_wraps_item_schema() {
        let schema = batch_arguments_schema();
        assert_eq!(
            schema["properties"]["classified_statuses"]["items"],
            classified_status_schema()
        );
        assert_eq!(schema["required"], json!(["classified_statuses"]));
    }

    #[test]
    fn test_substatus_is_optional() {
        let schema = classified_status_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(!required.contains(&json!("substatus_type")));
        assert_eq!(gemini_response_schema()["items"]["properties"]["substatus_type"]["nullable"], true);
    }
}
