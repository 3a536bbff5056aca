//! Error types for rowreport library.
//!
//! Only file-level and batch-level failures travel through [`Error`].
//! Field-level and row-level failures have their own types and are contained
//! where they happen: a [`FieldCoercionError`] becomes an error marker in the
//! normalized output, a [`RowError`] becomes a [`RowFailure`] entry in the
//! batch report.

use std::io;
use thiserror::Error;

/// Result type alias for rowreport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole operation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a well-formed tabular document or has no data rows.
    #[error("Unreadable spreadsheet: {0}")]
    UnreadableFile(String),

    /// Rendering failed irrecoverably.
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Every row of the batch failed to render.
    #[error("No reports could be generated ({failed} rows failed)")]
    EmptyBatch {
        /// Number of rows that failed.
        failed: usize,
    },

    /// The batch had no rows to render.
    #[error("No rows to report on")]
    NoRows,

    /// Two archive entries resolved to the same name.
    #[error("Duplicate archive entry name: {0}")]
    NamingCollision(String),

    /// The archive writer failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::UnreadableFile(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Archive(err.to_string()),
        }
    }
}

/// Failure while laying out or serializing a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Page geometry leaves no room for content.
    #[error("Page layout failed: {0}")]
    Layout(String),

    /// A single glyph does not fit into the available line width.
    #[error("Character {ch:?} is {width:.1}pt wide but only {available:.1}pt are available")]
    UnitTooWide {
        /// The offending character.
        ch: char,
        /// Its width in points.
        width: f32,
        /// The available width in points.
        available: f32,
    },

    /// A table row is taller than a whole page.
    #[error("Table row is {height:.1}pt tall but a page holds {available:.1}pt")]
    RowTooTall {
        /// Row height in points.
        height: f32,
        /// Usable page height in points.
        available: f32,
    },

    /// Writing the PDF object graph failed.
    #[error("PDF serialization error: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<RowError> for Error {
    fn from(err: RowError) -> Self {
        match err {
            RowError::Render(e) => Error::Render(e),
            RowError::Compose(msg) => Error::Other(msg),
        }
    }
}

/// A single value could not be converted to text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot coerce value in column '{column}': {reason}")]
pub struct FieldCoercionError {
    /// Source column name.
    pub column: String,
    /// Why the value was rejected.
    pub reason: String,
}

/// Failure of a single row; recorded and skipped by the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// The layout policy rejected the row.
    #[error("Composition failed: {0}")]
    Compose(String),

    /// The renderer rejected the row's document tree.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A row that was skipped, with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based row number in the source table.
    pub row: usize,
    /// What went wrong.
    pub error: RowError,
}

impl RowFailure {
    /// Create a new failure record.
    pub fn new(row: usize, error: RowError) -> Self {
        Self { row, error }
    }
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}
