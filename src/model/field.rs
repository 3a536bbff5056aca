//! Normalized (label, value) pairs.

use serde::{Deserialize, Serialize};

/// A canonicalized field ready for layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedField {
    /// Original column name
    pub column: String,

    /// Humanized column name (e.g. `affected_product` → `Affected Product`)
    pub label: String,

    /// Canonical string form of the value, or the missing/error marker
    pub value: String,

    /// Whether the source value was missing
    pub is_missing: bool,

    /// Whether coercion failed and `value` holds the error marker
    pub is_error: bool,
}

impl NormalizedField {
    /// Create a field with a present value.
    pub fn new(
        column: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
            value: value.into(),
            is_missing: false,
            is_error: false,
        }
    }

    /// Create a field whose value is missing; `marker` is rendered instead.
    pub fn missing(
        column: impl Into<String>,
        label: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            is_missing: true,
            ..Self::new(column, label, marker)
        }
    }

    /// Create a field whose value could not be coerced.
    pub fn error(
        column: impl Into<String>,
        label: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            is_error: true,
            ..Self::new(column, label, marker)
        }
    }

    /// `"{label}: {value}"`.
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}
