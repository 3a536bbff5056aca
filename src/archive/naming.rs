//! Archive entry naming.

use chrono::NaiveDateTime;

use crate::model::RenderedDocument;

const MAX_SUFFIX_LEN: usize = 64;

/// How archive entries are named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryNaming {
    /// `row_{N}.pdf`
    #[default]
    RowNumber,

    /// `row_{N}_{value}.pdf`, where the value comes from the named column.
    ///
    /// Rows whose value is missing or sanitizes to nothing fall back to
    /// `row_{N}.pdf`.
    RowAndColumn(String),
}

impl EntryNaming {
    /// Column whose value identifies a row, if any.
    pub fn source_column(&self) -> Option<&str> {
        match self {
            EntryNaming::RowNumber => None,
            EntryNaming::RowAndColumn(column) => Some(column),
        }
    }

    /// Entry name for a rendered document.
    pub fn entry_name(&self, doc: &RenderedDocument) -> String {
        let suffix = match self {
            EntryNaming::RowNumber => None,
            EntryNaming::RowAndColumn(_) => doc
                .source_id
                .as_deref()
                .map(sanitize_component)
                .filter(|s| !s.is_empty()),
        };
        match suffix {
            Some(suffix) => format!("row_{}_{}.pdf", doc.row, suffix),
            None => format!("row_{}.pdf", doc.row),
        }
    }
}

/// Options for archive construction.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// Entry naming scheme
    pub naming: EntryNaming,

    /// Modification time stamped on every entry (`None` = 1980-01-01)
    pub modified: Option<NaiveDateTime>,
}

impl ArchiveOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming scheme.
    pub fn with_naming(mut self, naming: EntryNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the entry modification time.
    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// Reduce a value to a file-name-safe component.
///
/// ASCII letters, digits, `-` and `.` are kept; every other run of
/// characters becomes one `_`. Leading and trailing `_` and `.` are removed
/// and the result is capped at 64 bytes.
pub fn sanitize_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    let capped: String = trimmed.chars().take(MAX_SUFFIX_LEN).collect();
    capped.trim_end_matches(['_', '.']).to_string()
}
