//! Policy lookup by column signature.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::canonical_column;
use super::policy::{LayoutPolicy, SectionedPolicy, SummaryPolicy};
use crate::model::{NormalizedField, Record};

/// Sorted, folded column names identifying a spreadsheet layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnSignature(Vec<String>);

impl ColumnSignature {
    /// Build a signature from column names.
    pub fn new<S: AsRef<str>>(columns: impl IntoIterator<Item = S>) -> Self {
        let mut folded: Vec<String> = columns
            .into_iter()
            .map(|c| canonical_column(c.as_ref()))
            .collect();
        folded.sort();
        folded.dedup();
        Self(folded)
    }

    /// Signature of a row's normalized fields.
    pub fn of_fields(fields: &[NormalizedField]) -> Self {
        Self::new(fields.iter().map(|f| f.column.as_str()))
    }

    /// Signature of a record.
    pub fn of_record(record: &Record) -> Self {
        Self::new(record.columns())
    }

    /// Folded column names, sorted.
    pub fn columns(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ColumnSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Maps column signatures to layout policies.
///
/// Lookup is exact; rows whose signature has no entry use the default
/// policy.
pub struct PolicyRegistry {
    policies: BTreeMap<ColumnSignature, Arc<dyn LayoutPolicy>>,
    default: Arc<dyn LayoutPolicy>,
}

impl PolicyRegistry {
    /// Create a registry with only a fallback policy.
    pub fn new(default: Arc<dyn LayoutPolicy>) -> Self {
        Self {
            policies: BTreeMap::new(),
            default,
        }
    }

    /// Summary fallback plus the incident report layout.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Arc::new(SummaryPolicy::new()));
        registry.register(
            ColumnSignature::new(SectionedPolicy::incident_columns().iter()),
            Arc::new(SectionedPolicy::incident_report()),
        );
        registry
    }

    /// Register a policy for a signature, replacing any previous entry.
    pub fn register(&mut self, signature: ColumnSignature, policy: Arc<dyn LayoutPolicy>) {
        self.policies.insert(signature, policy);
    }

    /// Replace the fallback policy.
    pub fn set_default(&mut self, policy: Arc<dyn LayoutPolicy>) {
        self.default = policy;
    }

    /// Policy for a row's fields.
    pub fn resolve(&self, fields: &[NormalizedField]) -> &dyn LayoutPolicy {
        self.resolve_signature(&ColumnSignature::of_fields(fields))
    }

    /// Policy for a signature.
    pub fn resolve_signature(&self, signature: &ColumnSignature) -> &dyn LayoutPolicy {
        self.policies
            .get(signature)
            .unwrap_or(&self.default)
            .as_ref()
    }

    /// Number of registered (non-default) policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether only the default policy is present.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::normalize::normalize;

    #[test]
    fn test_signature_is_order_insensitive() {
        let a = ColumnSignature::new(["Name", "Age"]);
        let b = ColumnSignature::new(["age", "name"]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "[age, name]");
    }

    #[test]
    fn test_resolve_default() {
        let registry = PolicyRegistry::with_defaults();
        assert_eq!(registry.len(), 1);

        let record = Record::from_pairs([("Name", Value::from("Ann"))]);
        assert_eq!(registry.resolve(&normalize(&record)).name(), "summary");
    }

    #[test]
    fn test_resolve_incident_layout() {
        let registry = PolicyRegistry::with_defaults();
        let record = Record::from_pairs(
            SectionedPolicy::incident_columns()
                .iter()
                .map(|c| (*c, Value::from("x"))),
        );
        assert_eq!(registry.resolve(&normalize(&record)).name(), "sectioned");
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = PolicyRegistry::new(Arc::new(SummaryPolicy::new()));
        assert!(registry.is_empty());
        registry.register(
            ColumnSignature::new(["a"]),
            Arc::new(super::super::FieldTablePolicy::new()),
        );
        let sig = ColumnSignature::new(["A"]);
        assert_eq!(registry.resolve_signature(&sig).name(), "field-table");
    }
}
