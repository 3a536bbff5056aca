//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// Bytes of a rendered document together with layout statistics.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// The encoded document
    pub bytes: Vec<u8>,

    /// Layout statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(bytes: Vec<u8>, stats: RenderStats) -> Self {
        Self { bytes, stats }
    }

    /// Get the output length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the output is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Statistics collected during layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of pages emitted
    pub page_count: u32,

    /// Number of headings laid out
    pub heading_count: u32,

    /// Number of paragraphs laid out
    pub paragraph_count: u32,

    /// Number of bullet items laid out
    pub bullet_count: u32,

    /// Number of tables laid out
    pub table_count: u32,

    /// Number of table body rows drawn
    pub table_row_count: u32,

    /// Number of text lines placed (wrapped lines count separately)
    pub line_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }
}
