//! # rowreport
//!
//! Turn each row of a spreadsheet into its own PDF report and bundle the
//! reports into one ZIP archive.
//!
//! The pipeline has four stages, each a pure function of its input:
//! normalize a [`Record`] into labelled fields, compose the fields into an
//! abstract [`DocumentTree`], render the tree to PDF, and archive the
//! documents under names derived from their source row numbers.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> rowreport::Result<()> {
//!     let archive = rowreport::build_archive_from_file("issues.xlsx")?;
//!     std::fs::write("reports.zip", &archive.bytes)?;
//!
//!     for failure in &archive.failures {
//!         eprintln!("{}", failure);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Tabular input**: xlsx, xlsm, xls, ods (calamine) and CSV
//! - **Pluggable layouts**: policies chosen per column signature
//! - **Deterministic output**: identical input and timestamp give identical bytes
//! - **Partial failure**: a failing row is reported and skipped, never fatal
//! - **Parallel processing**: uses Rayon to render rows, order preserved

pub mod archive;
pub mod batch;
pub mod compose;
pub mod detect;
pub mod error;
pub mod model;
pub mod normalize;
pub mod render;
pub mod service;
pub mod source;

// Re-export commonly used types
pub use archive::{Archive, ArchiveBuilder, ArchiveOptions, EntryNaming};
pub use batch::{BatchOutcome, BatchReport, ReportPipeline};
pub use compose::{
    ColumnSignature, DocumentComposer, FieldGroup, FieldTablePolicy, LayoutPolicy,
    PolicyRegistry, SectionedPolicy, SummaryPolicy,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SheetFormat};
pub use error::{Error, FieldCoercionError, RenderError, Result, RowError, RowFailure};
pub use model::{
    ArchiveEntry, DocumentNode, DocumentTree, NormalizedField, Record, RenderedDocument,
    SourceRow, Value,
};
pub use normalize::{NormalizeOptions, RecordNormalizer};
pub use render::{JsonFormat, PageGeometry, PdfRenderer, RenderOptions, StyleTable};
pub use service::{Download, InMemoryStore, ReportId, ReportService, SpreadsheetStore};
pub use source::{SourceRegistry, TabularSource};

use std::path::Path;

/// Read every data row of a spreadsheet file.
///
/// The reader is chosen by extension, falling back to content sniffing.
///
/// # Example
///
/// ```no_run
/// let rows = rowreport::read_file("issues.csv").unwrap();
/// println!("{} rows", rows.len());
/// ```
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<SourceRow>> {
    SourceRegistry::with_defaults().read_path(path.as_ref())
}

/// Read every data row from in-memory file contents.
///
/// `ext` is the original file extension, if known.
pub fn read_bytes(data: &[u8], ext: Option<&str>) -> Result<Vec<SourceRow>> {
    SourceRegistry::with_defaults().read_bytes(data, ext)
}

/// Render a single record to PDF bytes with default layout.
///
/// # Example
///
/// ```
/// use rowreport::{render_record, Record, RenderOptions, Value};
///
/// let record = Record::from_pairs([("Name", Value::from("John Doe"))]);
/// let pdf = render_record(&record, 1, &RenderOptions::default()).unwrap();
/// assert!(pdf.starts_with(b"%PDF"));
/// ```
pub fn render_record(record: &Record, row: usize, options: &RenderOptions) -> Result<Vec<u8>> {
    let fields = normalize::normalize(record);
    let tree = compose::compose(&fields, row);
    Ok(render::to_pdf(&tree, options)?)
}

/// Render every row with the default pipeline, collecting failures.
pub fn render_rows(rows: &[SourceRow]) -> BatchReport {
    ReportPipeline::default().run(rows)
}

/// Read a spreadsheet and archive one PDF per row.
///
/// Fails when the file cannot be read or when no row rendered.
pub fn build_archive_from_file<P: AsRef<Path>>(path: P) -> Result<Archive> {
    let rows = read_file(path)?;
    ReportPipeline::default().build_archive(&rows)
}
