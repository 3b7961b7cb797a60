// crates/core/src/prompt.rs
//! Prompt templates for status classification.
//!
//! Pure string templating: no I/O, no validation. Classification quality is
//! entirely the model's responsibility; these functions only describe the
//! taxonomy and the input batch.

use crate::catalog::{CategoryCatalog, DEFAULT_STATUS_TYPE, NUMERIC_STATUS_TYPE};

/// System instructions for the batching adapters.
pub fn build_system_prompt(catalog: &CategoryCatalog) -> String {
    let catalog_json = serde_json::to_string(catalog).unwrap_or_default();
    format!(
        r#"Classify each status into a status type and substatus type based on the following category dictionary delimited by triple backticks:
```{catalog_json}```

- The keys from the category dictionary are status types, and their values are valid substatus types.
- The status type should never be `null`. If a status cannot be classified into any specific status type, return `{DEFAULT_STATUS_TYPE}` as the status type.
- If a status type allows `null`, the substatus type may be `null` only if no better match exists or the status is ambiguous.
- Only return valid combinations from the given dictionary.
- If the status is too ambiguous to classify accurately, return `{DEFAULT_STATUS_TYPE}` as the `status_type` and `null` for the `substatus_type`.
- Return exactly one classification per input status, in the same order, with `status_name` set to the input status copied verbatim."#
    )
}

/// User message for a batch of raw statuses.
pub fn build_user_prompt(statuses: &[String]) -> String {
    let rendered = serde_json::to_string(statuses).unwrap_or_default();
    format!("Classify these statuses delimited by triple backticks ```{rendered}```")
}

/// Render catalog pairs as `[('Type', 'Sub'), ('Type', None), ...]`.
fn render_pairs(catalog: &CategoryCatalog) -> String {
    let pairs: Vec<String> = catalog
        .pairs()
        .into_iter()
        .map(|(status, sub)| match sub {
            Some(s) => format!("('{status}', '{s}')"),
            None => format!("('{status}', None)"),
        })
        .collect();
    format!("[{}]", pairs.join(", "))
}

/// System instructions for the fine-tuned, one-status-per-call variant.
///
/// Lists the flattened valid pairs instead of the dictionary and adds the
/// numeric-only rule the fine-tuned model was trained on.
pub fn build_pair_system_prompt(catalog: &CategoryCatalog) -> String {
    format!(
        "Classify the given status into a status type and substatus type using only these valid pairs:\n\
         {pairs}. Do not invent or mix status types and substatus types.\n\
         If the status is only composed of numbers, use this pair: ('{NUMERIC_STATUS_TYPE}', None).\n\
         If you cannot determine a better classification or if the status is too ambiguous,\n\
         use this pair as default: ('{DEFAULT_STATUS_TYPE}', None).",
        pairs = render_pairs(catalog),
    )
}

/// User message for a single status (fine-tuned variant).
pub fn build_single_user_prompt(status: &str) -> String {
    format!("Classify the status: `{status}`")
}
