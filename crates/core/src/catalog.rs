// crates/core/src/catalog.rs
//! Shipment-status taxonomy: which substatus types each status type permits.
//!
//! The catalog is plain data. It is built once at startup (either the built-in
//! shipment taxonomy or a JSON file supplied by the operator) and shared
//! read-only for the life of the process.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Status type used when nothing more specific applies.
pub const DEFAULT_STATUS_TYPE: &str = "Transit";

/// Status type for statuses made only of digits (fine-tuned prompt variant).
pub const NUMERIC_STATUS_TYPE: &str = "Info";

/// A permitted substatus. `None` is the explicit "no substatus" marker.
pub type SubstatusType = Option<String>;

/// Errors raised while building a catalog from external data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Status type must be a non-empty string")]
    EmptyStatusType,

    #[error("Catalog has no status types")]
    Empty,

    #[error("Status type '{0}' has no permitted substatus types")]
    NoSubstatuses(String),

    #[error("Invalid catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Immutable mapping `status type -> set of permitted substatus types`.
///
/// Keys are never empty; the "no substatus" marker may appear in a value set
/// but never as a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    entries: BTreeMap<String, BTreeSet<SubstatusType>>,
}

impl CategoryCatalog {
    /// Build a catalog, rejecting blank status types and empty value sets.
    pub fn new<K, I>(entries: impl IntoIterator<Item = (K, I)>) -> Result<Self, CatalogError>
    where
        K: Into<String>,
        I: IntoIterator<Item = SubstatusType>,
    {
        let mut map = BTreeMap::new();
        for (key, values) in entries {
            let key = key.into();
            if key.trim().is_empty() {
                return Err(CatalogError::EmptyStatusType);
            }
            let set: BTreeSet<SubstatusType> = values.into_iter().collect();
            if set.is_empty() {
                return Err(CatalogError::NoSubstatuses(key));
            }
            map.entry(key).or_insert_with(BTreeSet::new).extend(set);
        }
        if map.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { entries: map })
    }

    /// The built-in shipment-status taxonomy.
    pub fn shipment_default() -> Self {
        fn some(values: &[&str]) -> Vec<SubstatusType> {
            values.iter().map(|v| Some((*v).to_string())).collect()
        }

        let exception = some(&[
            "Cancelled",
            "Carrier Delays",
            "Claims Issued",
            "Customs/Tax Delays",
            "Delayed",
            "Incorrect Info",
            "Loss/Returns",
            "Natural Causes",
            "Other Delays",
            "Returned",
            "Traffic Delays",
        ]);
        let info = vec![None];
        let mut transit = vec![None];
        transit.extend(some(&[
            "Customs/Tax Delays",
            "Delayed",
            "Delivered",
            "Documents Handover",
            "Incorrect Info",
            "Onboard at Departure Terminal",
            "Other Delays",
            "Pick Up Confirmed",
        ]));

        let entries = [
            ("Exception".to_string(), exception),
            (NUMERIC_STATUS_TYPE.to_string(), info),
            (DEFAULT_STATUS_TYPE.to_string(), transit),
        ];
        let map = entries
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().collect()))
            .collect();
        Self { entries: map }
    }

    /// Parse a catalog from a JSON object of `{"Type": ["Sub", null, ...]}`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<SubstatusType>> = serde_json::from_str(json)?;
        Self::new(raw)
    }

    /// Load a catalog from a JSON file on disk.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let catalog = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            status_types = catalog.len(),
            "Loaded category catalog"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `(status_type, substatus_type)` is a valid combination.
    pub fn permits(&self, status_type: &str, substatus_type: Option<&str>) -> bool {
        self.entries.get(status_type).is_some_and(|subs| {
            subs.iter().any(|s| s.as_deref() == substatus_type)
        })
    }

    /// Every valid `(status_type, substatus_type)` pair, in catalog order.
    pub fn pairs(&self) -> Vec<(&str, Option<&str>)> {
        self.entries
            .iter()
            .flat_map(|(k, subs)| subs.iter().map(move |s| (k.as_str(), s.as_deref())))
            .collect()
    }
}

impl Serialize for CategoryCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_default_shape() {
        let catalog = CategoryCatalog::shipment_default();
        assert_eq!(
            catalog.entries.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["Exception", "Info", "Transit"]
        );
        assert_eq!(catalog.entries["Exception"].len(), 11);
        assert_eq!(catalog.entries["Info"].len(), 1);
        assert_eq!(catalog.entries["Transit"].len(), 9);
    }

    #[test]
    fn test_permits() {
        let catalog = CategoryCatalog::shipment_default();
        assert!(catalog.permits("Exception", Some("Cancelled")));
        assert!(catalog.permits("Transit", None));
        assert!(catalog.permits("Info", None));
        assert!(!catalog.permits("Exception", None));
        assert!(!catalog.permits("Info", Some("Delivered")));
        assert!(!catalog.permits("Unknown", None));
    }

    #[test]
    fn test_pairs_flatten_in_order() {
        let catalog = CategoryCatalog::from_json(
            r#"{"Transit": [null, "Delivered"], "Exception": ["Cancelled"]}"#,
        )
        .unwrap();
        assert_eq!(
            catalog.pairs(),
            vec![
                ("Exception", Some("Cancelled")),
                ("Transit", None),
                ("Transit", Some("Delivered")),
            ]
        );
    }

    #[test]
    fn test_from_json_rejects_blank_key() {
        let err = CategoryCatalog::from_json(r#"{"  ": [null]}"#).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyStatusType));
    }

    #[test]
    fn test_from_json_rejects_empty_catalog() {
        let err = CategoryCatalog::from_json("{}").unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn test_from_json_rejects_empty_values() {
        let err = CategoryCatalog::from_json(r#"{"Info": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::NoSubstatuses(ref k) if k == "Info"));
    }

    #[test]
    fn test_serializes_none_as_null() {
        let catalog = CategoryCatalog::from_json(r#"{"Info": [null]}"#).unwrap();
        assert_eq!(serde_json::to_string(&catalog).unwrap(), r#"{"Info":[null]}"#);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"Exception": ["Returned"]}"#).unwrap();

        let catalog = CategoryCatalog::load(&path).await.unwrap();
        assert!(catalog.permits("Exception", Some("Returned")));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = CategoryCatalog::load(Path::new("/nonexistent/catalog.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }
}
