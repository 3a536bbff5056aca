//! Rendered output types.

/// Portable document bytes for one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// 1-based source row number
    pub row: usize,

    /// Optional source identifier used for entry naming
    pub source_id: Option<String>,

    /// The PDF bytes
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// Create a rendered document for a row.
    pub fn new(row: usize, bytes: Vec<u8>) -> Self {
        Self {
            row,
            source_id: None,
            bytes,
        }
    }

    /// Attach a source identifier.
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the document has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One named blob inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name, unique within one archive
    pub name: String,

    /// Entry contents
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    /// Create a new entry.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}
