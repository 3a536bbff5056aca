//! Tabular sources: turning spreadsheet files into ordered records.
//!
//! Readers are registered in a [`SourceRegistry`] by file extension. When a
//! file has no usable extension, the registry falls back to content sniffing
//! via [`crate::detect`].
//!
//! # Example
//!
//! ```no_run
//! use rowreport::source::SourceRegistry;
//! use std::path::Path;
//!
//! fn main() -> rowreport::Result<()> {
//!     let registry = SourceRegistry::with_defaults();
//!     let rows = registry.read_path(Path::new("issues.xlsx"))?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

mod delimited;
mod workbook;

pub use delimited::CsvSource;
pub use workbook::WorkbookSource;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{Record, SourceRow, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for tabular file readers.
///
/// Implementations return every data row in source order, each tagged with
/// its 1-based position. A file that is not well formed, or that contains a
/// header but no data rows, is rejected with [`Error::UnreadableFile`].
pub trait TabularSource: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this reader.
    fn name(&self) -> &str;

    /// Read rows from in-memory file contents.
    fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<SourceRow>>;

    /// Read rows from a file on disk.
    fn read_path(&self, path: &Path) -> Result<Vec<SourceRow>> {
        let data = std::fs::read(path)?;
        self.read_bytes(&data)
    }

    /// Check if this reader supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry of tabular readers keyed by extension.
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn TabularSource>>,
    by_name: HashMap<String, Arc<dyn TabularSource>>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the workbook, CSV and TSV readers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WorkbookSource::new()));
        registry.register(Arc::new(CsvSource::new()));
        registry.register(Arc::new(CsvSource::tsv()));
        registry
    }

    /// Register a reader for all its supported extensions.
    pub fn register(&mut self, source: Arc<dyn TabularSource>) {
        for ext in source.supported_extensions() {
            self.sources.insert(ext.to_lowercase(), source.clone());
        }
        self.by_name.insert(source.name().to_lowercase(), source);
    }

    /// Get a reader by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn TabularSource>> {
        self.sources.get(&ext.to_lowercase()).cloned()
    }

    /// Get a reader by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn TabularSource>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.sources.contains_key(&ext.to_lowercase())
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.sources.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Read a file, choosing the reader by extension or by content.
    pub fn read_path(&self, path: &Path) -> Result<Vec<SourceRow>> {
        let data = std::fs::read(path)?;
        let ext = path.extension().and_then(|e| e.to_str());
        self.read_bytes(&data, ext)
    }

    /// Read in-memory file contents.
    ///
    /// `ext` selects the reader when it is registered; otherwise the format
    /// is sniffed from the bytes.
    pub fn read_bytes(&self, bytes: &[u8], ext: Option<&str>) -> Result<Vec<SourceRow>> {
        let source = match ext.and_then(|e| self.get_by_extension(e)) {
            Some(source) => source,
            None => {
                let format = detect_format_from_bytes(bytes)?;
                log::debug!("sniffed {} input", format);
                self.get_by_extension(format.extension())
                    .ok_or_else(|| Error::Other(format!("No reader for {} input", format)))?
            }
        };
        source.read_bytes(bytes)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Make header names usable as unique column keys.
///
/// Blank headers become `Unnamed: {index}` and repeated names get `.1`,
/// `.2`, ... suffixes, so a header row always yields one unique column per
/// position.
pub fn unique_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();
    for (index, name) in raw.into_iter().enumerate() {
        let name = name.as_ref().trim();
        let base = if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        while out.contains(&candidate) {
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}.{}", base, n);
        }
        out.push(candidate);
    }
    out
}

/// Assemble source rows from a header and raw cell rows.
///
/// Fully blank rows are skipped; short rows are padded with missing values.
/// Fails when no data rows remain.
pub(crate) fn build_rows(
    headers: &[String],
    cells: impl IntoIterator<Item = Vec<Value>>,
) -> Result<Vec<SourceRow>> {
    if headers.is_empty() {
        return Err(Error::UnreadableFile(
            "the header row is empty".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for values in cells {
        if values.iter().all(Value::is_missing) {
            continue;
        }
        if values.len() > headers.len() {
            log::warn!(
                "row {} has {} cells but only {} columns; extra cells ignored",
                rows.len() + 1,
                values.len(),
                headers.len()
            );
        }

        let mut values = values.into_iter();
        let record = Record::from_pairs(
            headers
                .iter()
                .map(|h| (h.clone(), values.next().unwrap_or(Value::Empty))),
        );
        rows.push(SourceRow::new(rows.len() + 1, record));
    }

    if rows.is_empty() {
        return Err(Error::UnreadableFile(
            "the spreadsheet has no data rows".to_string(),
        ));
    }
    Ok(rows)
}
