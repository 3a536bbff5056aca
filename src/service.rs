//! Upload, listing and download operations over stored spreadsheets.
//!
//! This is the transport-independent core of the report service: an HTTP
//! layer only has to map [`Download`] onto a response and `Ok(None)` onto a
//! not-found status.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::batch::ReportPipeline;
use crate::error::{Error, Result};
use crate::model::SourceRow;
use crate::source::SourceRegistry;

/// Identifier of a stored spreadsheet.
pub type SpreadsheetId = u64;

/// Extensions accepted by [`ReportService::upload`].
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

/// A stored upload.
#[derive(Debug, Clone)]
pub struct StoredSpreadsheet {
    /// Identifier
    pub id: SpreadsheetId,
    /// Original file name
    pub file_name: String,
    /// Upload time
    pub uploaded_at: DateTime<Utc>,
    /// Whether a report archive has been produced
    pub processed: bool,
    /// File contents
    pub bytes: Arc<Vec<u8>>,
}

/// Listing entry for a stored spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadsheetInfo {
    /// Identifier
    pub id: SpreadsheetId,
    /// Original file name
    pub file_name: String,
    /// Upload time
    pub uploaded_at: DateTime<Utc>,
    /// Whether a report archive has been produced
    pub processed: bool,
}

impl From<&StoredSpreadsheet> for SpreadsheetInfo {
    fn from(s: &StoredSpreadsheet) -> Self {
        Self {
            id: s.id,
            file_name: s.file_name.clone(),
            uploaded_at: s.uploaded_at,
            processed: s.processed,
        }
    }
}

/// Storage backend for uploaded spreadsheets.
pub trait SpreadsheetStore: Send + Sync {
    /// Store a file and return its new identifier.
    fn insert(&self, file_name: &str, bytes: Vec<u8>, uploaded_at: DateTime<Utc>) -> SpreadsheetId;

    /// Fetch a stored file.
    fn get(&self, id: SpreadsheetId) -> Option<StoredSpreadsheet>;

    /// All stored files, in any order.
    fn all(&self) -> Vec<SpreadsheetInfo>;

    /// Flag a file as processed. Returns `false` for unknown ids.
    fn mark_processed(&self, id: SpreadsheetId) -> bool;
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: SpreadsheetId,
    entries: BTreeMap<SpreadsheetId, StoredSpreadsheet>,
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpreadsheetStore for InMemoryStore {
    fn insert(&self, file_name: &str, bytes: Vec<u8>, uploaded_at: DateTime<Utc>) -> SpreadsheetId {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.insert(
            id,
            StoredSpreadsheet {
                id,
                file_name: file_name.to_string(),
                uploaded_at,
                processed: false,
                bytes: Arc::new(bytes),
            },
        );
        id
    }

    fn get(&self, id: SpreadsheetId) -> Option<StoredSpreadsheet> {
        self.inner.read().entries.get(&id).cloned()
    }

    fn all(&self) -> Vec<SpreadsheetInfo> {
        self.inner
            .read()
            .entries
            .values()
            .map(SpreadsheetInfo::from)
            .collect()
    }

    fn mark_processed(&self, id: SpreadsheetId) -> bool {
        match self.inner.write().entries.get_mut(&id) {
            Some(entry) => {
                entry.processed = true;
                true
            }
            None => false,
        }
    }
}

/// Bytes plus the headers needed to serve them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Body
    pub bytes: Vec<u8>,
    /// MIME type
    pub content_type: &'static str,
    /// `Content-Disposition` header value
    pub content_disposition: Option<String>,
}

impl Download {
    fn attachment(bytes: Vec<u8>, content_type: &'static str, file_name: &str) -> Self {
        Self {
            bytes,
            content_type,
            content_disposition: Some(format!("attachment; filename=\"{}\"", file_name)),
        }
    }
}

/// Address of one row's report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportId {
    /// Spreadsheet identifier
    pub spreadsheet: SpreadsheetId,
    /// 1-based data row
    pub row: usize,
}

/// Report service over a spreadsheet store.
pub struct ReportService<S: SpreadsheetStore = InMemoryStore> {
    store: S,
    sources: SourceRegistry,
    pipeline: ReportPipeline,
}

impl ReportService<InMemoryStore> {
    /// Service over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }
}

impl<S: SpreadsheetStore> ReportService<S> {
    /// Create a service over a store with default readers and pipeline.
    pub fn new(store: S) -> Self {
        Self {
            store,
            sources: SourceRegistry::with_defaults(),
            pipeline: ReportPipeline::default(),
        }
    }

    /// Replace the pipeline.
    pub fn with_pipeline(mut self, pipeline: ReportPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the reader registry.
    pub fn with_sources(mut self, sources: SourceRegistry) -> Self {
        self.sources = sources;
        self
    }

    /// Get the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and store an upload.
    ///
    /// The file must carry a spreadsheet extension, be non-empty and parse
    /// to at least one data row.
    pub fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<SpreadsheetId> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .filter(|e| ACCEPTED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| {
                Error::UnreadableFile(format!(
                    "'{}' is not a spreadsheet; upload an .xlsx, .xlsm, .xls, .ods or .csv file",
                    file_name
                ))
            })?;
        if bytes.is_empty() {
            return Err(Error::UnreadableFile(format!("'{}' is empty", file_name)));
        }

        let rows = self.sources.read_bytes(&bytes, Some(ext.as_str()))?;
        let id = self.store.insert(file_name, bytes, Utc::now());
        log::info!("stored '{}' as spreadsheet {} ({} rows)", file_name, id, rows.len());
        Ok(id)
    }

    /// Stored spreadsheets, newest first.
    pub fn list(&self) -> Vec<SpreadsheetInfo> {
        let mut all = self.store.all();
        all.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        all
    }

    /// ZIP archive of every row's report, or `None` for an unknown id.
    ///
    /// The spreadsheet is marked processed only when the archive was built.
    pub fn download_spreadsheet_reports(&self, id: SpreadsheetId) -> Result<Option<Download>> {
        let rows = match self.rows(id)? {
            Some(rows) => rows,
            None => return Ok(None),
        };

        let archive = match self.pipeline.build_archive(&rows) {
            Ok(archive) => archive,
            Err(e) => {
                log::warn!("spreadsheet {}: no archive produced: {}", id, e);
                return Err(e);
            }
        };
        self.store.mark_processed(id);

        Ok(Some(Download::attachment(
            archive.bytes,
            "application/zip",
            &format!("spreadsheet_{}_reports.zip", id),
        )))
    }

    /// PDF report for one row, or `None` for an unknown spreadsheet or row.
    pub fn download_report(&self, report: ReportId) -> Result<Option<Download>> {
        let rows = match self.rows(report.spreadsheet)? {
            Some(rows) => rows,
            None => return Ok(None),
        };
        let row = match rows.iter().find(|r| r.row == report.row) {
            Some(row) => row,
            None => return Ok(None),
        };

        let doc = self.pipeline.render_row(row)?;
        Ok(Some(Download::attachment(
            doc.bytes,
            "application/pdf",
            &format!("row_{}.pdf", report.row),
        )))
    }

    fn rows(&self, id: SpreadsheetId) -> Result<Option<Vec<SourceRow>>> {
        let stored = match self.store.get(id) {
            Some(stored) => stored,
            None => return Ok(None),
        };
        let ext = Path::new(&stored.file_name)
            .extension()
            .and_then(|e| e.to_str());
        self.sources.read_bytes(&stored.bytes, ext).map(Some)
    }
}
