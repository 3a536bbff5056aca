//! Document composition: normalized fields → abstract document tree.
//!
//! A [`LayoutPolicy`] decides which nodes a row becomes. The
//! [`DocumentComposer`] picks the policy for a row's column set from a
//! [`PolicyRegistry`], a plain lookup table with a default fallback, so the
//! same fields and row number always produce the same tree.
//!
//! # Example
//!
//! ```
//! use rowreport::compose::compose;
//! use rowreport::model::{DocumentNode, Record, Value};
//! use rowreport::normalize::normalize;
//!
//! let record = Record::from_pairs([("Name", Value::from("John Doe"))]);
//! let tree = compose(&normalize(&record), 1);
//! assert_eq!(tree.nodes[2], DocumentNode::bullet("Name: John Doe"));
//! ```

mod policy;
mod registry;

pub use policy::{
    FieldGroup, FieldTablePolicy, LayoutPolicy, SectionedPolicy, SummaryPolicy,
    DEFAULT_LONG_TEXT_COLUMNS,
};
pub use registry::{ColumnSignature, PolicyRegistry};

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::RowError;
use crate::model::{DocumentTree, NormalizedField};

/// Compose a tree with the default summary policy.
pub fn compose(fields: &[NormalizedField], row: usize) -> DocumentTree {
    SummaryPolicy::default().build(fields, row)
}

/// Routes each row to the layout policy registered for its column set.
#[derive(Clone, Default)]
pub struct DocumentComposer {
    registry: Arc<PolicyRegistry>,
}

impl DocumentComposer {
    /// Create a composer over a policy registry.
    pub fn new(registry: PolicyRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Get the registry.
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Compose a row's fields into a document tree.
    pub fn compose(&self, fields: &[NormalizedField], row: usize) -> Result<DocumentTree, RowError> {
        let policy = self.registry.resolve(fields);
        log::debug!("row {}: composing with policy '{}'", row, policy.name());
        policy.compose(fields, row)
    }
}

impl std::fmt::Debug for DocumentComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentComposer")
            .field("policies", &self.registry.len())
            .finish()
    }
}

/// Fold a column name for case- and separator-insensitive matching.
///
/// `Corrective Action`, `corrective_action` and `CORRECTIVE-ACTION` all fold
/// to `corrective_action`.
pub fn canonical_column(column: &str) -> String {
    column
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Collapse line breaks (and the whitespace around them) to one space.
pub(crate) fn single_line(text: &str) -> String {
    static LINE_BREAKS: OnceLock<Regex> = OnceLock::new();
    let re = LINE_BREAKS.get_or_init(|| Regex::new(r"[ \t]*(\r\n|\r|\n)+[ \t]*").unwrap());
    re.replace_all(text, " ").into_owned()
}
