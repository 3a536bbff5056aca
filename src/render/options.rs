//! Rendering options and configuration.

use chrono::{DateTime, Utc};

use super::style::{PageGeometry, StyleTable};
use crate::error::RenderError;

/// Options for rendering document trees.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Page size and margins
    pub geometry: PageGeometry,

    /// Fonts, sizes and colors per node kind
    pub styles: StyleTable,

    /// Timestamp written to the document info (`None` = now)
    ///
    /// This is the only input that makes two renders of the same tree differ.
    pub generated_at: Option<DateTime<Utc>>,

    /// Document title; defaults to the tree's first level-1 heading
    pub title: Option<String>,

    /// Draw a "Page i of n" footer
    pub page_numbers: bool,

    /// Producer string in the document info
    pub producer: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the style table.
    pub fn with_styles(mut self, styles: StyleTable) -> Self {
        self.styles = styles;
        self
    }

    /// Pin the generation timestamp.
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable or disable page numbers.
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// The timestamp to embed, resolving `None` to the current time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.generated_at.unwrap_or_else(Utc::now)
    }

    /// Check geometry and styles.
    pub fn validate(&self) -> Result<(), RenderError> {
        self.geometry.validate()?;
        self.styles.validate()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            styles: StyleTable::default(),
            generated_at: None,
            title: None,
            page_numbers: true,
            producer: format!("rowreport {}", env!("CARGO_PKG_VERSION")),
        }
    }
}
