// crates/core/src/audit.rs
//! Post-decode checks on a vendor classification.
//!
//! Vendors are asked (via prompt and schema) to return one entry per input,
//! in order, using only catalog combinations. Nothing enforces that, so the
//! audit reports deviations as warnings. It never alters the result.

use crate::catalog::CategoryCatalog;
use crate::llm::ClassificationResult;

/// One deviation between the request and what the vendor returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFinding {
    LengthMismatch {
        expected: usize,
        actual: usize,
    },
    NameMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    UnknownCombination {
        index: usize,
        status_type: String,
        substatus_type: Option<String>,
    },
}

/// Compare `result` with the `input` statuses and the catalog, log each
/// deviation at WARN, and return the findings.
pub fn audit_classification(
    provider: &str,
    input: &[String],
    result: &ClassificationResult,
    catalog: &CategoryCatalog,
) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    let output = &result.classified_statuses;

    if output.len() != input.len() {
        findings.push(AuditFinding::LengthMismatch {
            expected: input.len(),
            actual: output.len(),
        });
    }

    for (index, (expected, status)) in input.iter().zip(output).enumerate() {
        if *expected != status.status_name {
            findings.push(AuditFinding::NameMismatch {
                index,
                expected: expected.clone(),
                actual: status.status_name.clone(),
            });
        }
    }

    for (index, status) in output.iter().enumerate() {
        if !catalog.permits(&status.status_type, status.substatus_type.as_deref()) {
            findings.push(AuditFinding::UnknownCombination {
                index,
                status_type: status.status_type.clone(),
                substatus_type: status.substatus_type.clone(),
            });
        }
    }

    for finding in &findings {
        match finding {
            AuditFinding::LengthMismatch { expected, actual } => tracing::warn!(
                provider,
                expected,
                actual,
                "classification length differs from input"
            ),
            AuditFinding::NameMismatch {
                index,
                expected,
                actual,
            } => tracing::warn!(
                provider,
                index,
                expected = %expected,
                actual = %actual,
                "classified status_name differs from input"
            ),
            AuditFinding::UnknownCombination {
                index,
                status_type,
                substatus_type,
            } => tracing::warn!(
                provider,
                index,
                status_type = %status_type,
                substatus_type = ?substatus_type,
                "classification is not a catalog combination"
            ),
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ClassifiedStatus, TokenUsage};
    use pretty_assertions::assert_eq;

    fn status(name: &str, ty: &str, sub: Option<&str>) -> ClassifiedStatus {
        ClassifiedStatus {
            status_name: name.into(),
            status_type: ty.into(),
            substatus_type: sub.map(String::from),
        }
    }

    fn result(statuses: Vec<ClassifiedStatus>) -> ClassificationResult {
        ClassificationResult {
            classified_statuses: statuses,
            tokens_used: TokenUsage::new(),
        }
    }

    #[test]
    fn test_clean_result_has_no_findings() {
        let input = vec!["shipment has been cancelled".to_string(), "in transit".to_string()];
        let res = result(vec![
            status("shipment has been cancelled", "Exception", Some("Cancelled")),
            status("in transit", "Transit", None),
        ]);
        let findings =
            audit_classification("gpt", &input, &res, &CategoryCatalog::shipment_default());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_reports_every_kind_of_deviation() {
        let input = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let res = result(vec![
            status("a", "Exception", None),
            status("B", "Transit", Some("Delivered")),
        ]);
        let findings =
            audit_classification("claude", &input, &res, &CategoryCatalog::shipment_default());

        assert_eq!(
            findings,
            vec![
                AuditFinding::LengthMismatch { expected: 3, actual: 2 },
                AuditFinding::NameMismatch {
                    index: 1,
                    expected: "b".into(),
                    actual: "B".into(),
                },
                AuditFinding::UnknownCombination {
                    index: 0,
                    status_type: "Exception".into(),
                    substatus_type: None,
                },
            ]
        );
    }

    #[test]
    fn test_result_is_left_untouched() {
        let input = vec!["x".to_string()];
        let res = result(vec![status("x", "Bogus", Some("Nope"))]);
        let before = res.clone();
        audit_classification("gemini", &input, &res, &CategoryCatalog::shipment_default());
        assert_eq!(res, before);
    }
}
