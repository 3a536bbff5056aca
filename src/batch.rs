//! Batch driver: source rows → rendered documents → archive.
//!
//! Every row is processed independently. A row that fails is recorded as a
//! [`RowFailure`] and skipped; the batch never stops at the first failure.
//! With the `parallel` feature rows may render on a rayon pool, but results
//! are always collected in source order.
//!
//! A pipeline can also skip rows already flagged as handled in a status
//! column; skipped rows keep their source row numbers.

use std::borrow::Cow;

use crate::archive::{Archive, ArchiveBuilder, ArchiveOptions};
use crate::compose::{DocumentComposer, PolicyRegistry};
use crate::error::{Result, RowError, RowFailure};
use crate::model::{DocumentTree, RenderedDocument, SourceRow, Value};
use crate::normalize::{NormalizeOptions, RecordNormalizer};
use crate::render::{PdfRenderer, RenderOptions};

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// There were no rows.
    Empty,
    /// Every row rendered.
    Complete,
    /// Some rows rendered, some failed.
    Partial,
    /// Every row failed.
    Failed,
}

/// Per-row results of a batch, in source order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Documents of the rows that rendered
    pub documents: Vec<RenderedDocument>,
    /// Rows that were skipped
    pub failures: Vec<RowFailure>,
}

impl BatchReport {
    /// Number of rows processed.
    pub fn total_rows(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Classify the batch.
    pub fn outcome(&self) -> BatchOutcome {
        match (self.documents.is_empty(), self.failures.is_empty()) {
            (true, true) => BatchOutcome::Empty,
            (false, true) => BatchOutcome::Complete,
            (false, false) => BatchOutcome::Partial,
            (true, false) => BatchOutcome::Failed,
        }
    }
}

/// Configured pipeline from source rows to PDF documents.
///
/// # Example
///
/// ```
/// use rowreport::batch::ReportPipeline;
/// use rowreport::model::{Record, SourceRow, Value};
///
/// let rows = vec![SourceRow::new(
///     1,
///     Record::from_pairs([("Name", Value::from("John Doe"))]),
/// )];
/// let report = ReportPipeline::new().run(&rows);
/// assert_eq!(report.documents.len(), 1);
/// assert!(report.documents[0].bytes.starts_with(b"%PDF"));
/// ```
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    normalizer: RecordNormalizer,
    composer: DocumentComposer,
    render_options: RenderOptions,
    archive_options: ArchiveOptions,
    parallel: bool,
    skip_processed: Option<String>,
}

impl ReportPipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalizer = RecordNormalizer::new(options);
        self
    }

    /// Set the layout policy registry.
    pub fn with_registry(mut self, registry: PolicyRegistry) -> Self {
        self.composer = DocumentComposer::new(registry);
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Set archive options.
    pub fn with_archive_options(mut self, options: ArchiveOptions) -> Self {
        self.archive_options = options;
        self
    }

    /// Render rows on the rayon pool (no effect without the `parallel` feature).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Skip rows whose `column` reads as true (`True`, `true`, boolean cells).
    ///
    /// Missing or false values are rendered as usual.
    pub fn with_skip_processed(mut self, column: impl Into<String>) -> Self {
        self.skip_processed = Some(column.into());
        self
    }

    /// Get the render options.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Get the archive options.
    pub fn archive_options(&self) -> &ArchiveOptions {
        &self.archive_options
    }

    /// Normalize and compose one row without rendering it.
    pub fn compose_row(&self, row: &SourceRow) -> std::result::Result<DocumentTree, RowError> {
        let fields = self.normalizer.normalize_row(row);
        self.composer.compose(&fields, row.row)
    }

    /// Render one row to a PDF document.
    pub fn render_row(&self, row: &SourceRow) -> std::result::Result<RenderedDocument, RowError> {
        self.render_row_with(&PdfRenderer::new(self.pinned_options()), row)
    }

    fn render_row_with(
        &self,
        renderer: &PdfRenderer,
        row: &SourceRow,
    ) -> std::result::Result<RenderedDocument, RowError> {
        let tree = self.compose_row(row)?;
        let bytes = renderer.render(&tree)?;
        let mut doc = RenderedDocument::new(row.row, bytes);
        if let Some(column) = self.archive_options.naming.source_column() {
            if let Some(value) = row.record.get(column).filter(|v| !v.is_missing()) {
                if let Ok(text) = self.normalizer.coerce(column, value) {
                    doc = doc.with_source_id(text);
                }
            }
        }
        Ok(doc)
    }

    /// Render options with the generation timestamp fixed, so every document
    /// of one batch carries the same instant.
    fn pinned_options(&self) -> RenderOptions {
        let mut options = self.render_options.clone();
        options.generated_at = Some(options.timestamp());
        options
    }

    /// Check whether a row is flagged as processed.
    pub fn is_processed(&self, row: &SourceRow) -> bool {
        let column = match self.skip_processed.as_deref() {
            Some(column) => column,
            None => return false,
        };
        match row.record.get(column) {
            Some(Value::Bool(flag)) => *flag,
            Some(value) if !value.is_missing() => self
                .normalizer
                .coerce(column, value)
                .map(|text| text.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Rows left after dropping processed ones.
    pub fn pending_rows<'a>(&self, rows: &'a [SourceRow]) -> Cow<'a, [SourceRow]> {
        if self.skip_processed.is_none() {
            return Cow::Borrowed(rows);
        }
        let pending: Vec<SourceRow> = rows
            .iter()
            .filter(|row| !self.is_processed(row))
            .cloned()
            .collect();
        let skipped = rows.len() - pending.len();
        if skipped > 0 {
            log::info!("skipping {} processed rows", skipped);
        }
        Cow::Owned(pending)
    }

    /// Render every row, collecting failures instead of stopping.
    pub fn run(&self, rows: &[SourceRow]) -> BatchReport {
        let rows = self.pending_rows(rows);
        let rows = rows.as_ref();
        let renderer = PdfRenderer::new(self.pinned_options());
        let results = map_rows(rows, self.parallel, |row| {
            self.render_row_with(&renderer, row)
                .map_err(|e| RowFailure::new(row.row, e))
        });

        let mut report = BatchReport::default();
        for result in results {
            match result {
                Ok(doc) => report.documents.push(doc),
                Err(failure) => {
                    log::warn!("skipping {}", failure);
                    report.failures.push(failure);
                }
            }
        }

        log::info!(
            "batch finished: {} rows in, {} documents rendered, {} rows failed",
            rows.len(),
            report.documents.len(),
            report.failures.len()
        );
        report
    }

    /// Render every row and pack the documents into an archive.
    ///
    /// Fails with [`Error::NoRows`](crate::Error::NoRows) when there was no
    /// row to render and with [`Error::EmptyBatch`](crate::Error::EmptyBatch)
    /// when every row failed.
    pub fn build_archive(&self, rows: &[SourceRow]) -> Result<Archive> {
        let pinned = self.pinned_options();
        let pipeline = Self {
            render_options: pinned.clone(),
            ..self.clone()
        };
        let report = pipeline.run(rows);

        let mut archive_options = self.archive_options.clone();
        if archive_options.modified.is_none() {
            archive_options.modified = Some(pinned.timestamp().naive_utc());
        }
        ArchiveBuilder::new(archive_options).build(report.documents, report.failures)
    }
}

impl Default for ReportPipeline {
    fn default() -> Self {
        Self {
            normalizer: RecordNormalizer::default(),
            composer: DocumentComposer::default(),
            render_options: RenderOptions::default(),
            archive_options: ArchiveOptions::default(),
            parallel: cfg!(feature = "parallel"),
            skip_processed: None,
        }
    }
}

#[cfg(feature = "parallel")]
fn map_rows<T, F>(rows: &[SourceRow], parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&SourceRow) -> T + Sync + Send,
{
    use rayon::prelude::*;

    if parallel {
        rows.par_iter().map(f).collect()
    } else {
        rows.iter().map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_rows<T, F>(rows: &[SourceRow], _parallel: bool, f: F) -> Vec<T>
where
    F: Fn(&SourceRow) -> T,
{
    rows.iter().map(f).collect()
}
