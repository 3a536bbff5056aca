//! Archive building: rendered documents → one ZIP file.
//!
//! Entry names derive from the source row number, never from completion
//! order, so a caller can match `row_5.pdf` to row 5 even when rows 1-4
//! failed. Entries are written in row order with a fixed timestamp, so the
//! same documents always produce the same archive bytes.

mod naming;

pub use naming::{sanitize_component, ArchiveOptions, EntryNaming};

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use chrono::{Datelike, NaiveDateTime, Timelike};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result, RowFailure};
use crate::model::{ArchiveEntry, RenderedDocument};

/// A finished archive.
#[derive(Debug, Clone)]
pub struct Archive {
    /// ZIP bytes
    pub bytes: Vec<u8>,

    /// Entry names in archive order
    pub entries: Vec<String>,

    /// Rows that were skipped upstream
    pub failures: Vec<RowFailure>,
}

impl Archive {
    /// Check whether any row was skipped.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Build an archive with default options.
pub fn build_archive(documents: Vec<RenderedDocument>, failures: Vec<RowFailure>) -> Result<Archive> {
    ArchiveBuilder::new(ArchiveOptions::default()).build(documents, failures)
}

/// Collects rendered documents into a ZIP archive.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    options: ArchiveOptions,
    entries: Vec<(usize, ArchiveEntry)>,
    names: BTreeSet<String>,
}

impl ArchiveBuilder {
    /// Create an empty builder.
    pub fn new(options: ArchiveOptions) -> Self {
        Self {
            options,
            entries: Vec::new(),
            names: BTreeSet::new(),
        }
    }

    /// Get the options.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries were added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a document. Fails if its entry name is already taken.
    pub fn add(&mut self, doc: RenderedDocument) -> Result<&str> {
        let name = self.options.naming.entry_name(&doc);
        if !self.names.insert(name.clone()) {
            return Err(Error::NamingCollision(name));
        }
        self.entries.push((doc.row, ArchiveEntry::new(name, doc.bytes)));
        Ok(self.entries[self.entries.len() - 1].1.name.as_str())
    }

    /// Build an archive from a batch's documents and failures.
    ///
    /// Returns [`Error::NoRows`] when there was nothing to archive and
    /// [`Error::EmptyBatch`] when every row of the batch failed.
    pub fn build(
        mut self,
        documents: Vec<RenderedDocument>,
        failures: Vec<RowFailure>,
    ) -> Result<Archive> {
        if documents.is_empty() && self.entries.is_empty() {
            if failures.is_empty() {
                return Err(Error::NoRows);
            }
            return Err(Error::EmptyBatch {
                failed: failures.len(),
            });
        }
        for doc in documents {
            self.add(doc)?;
        }
        let (bytes, entries) = self.write()?;

        log::info!(
            "archive built: {} entries, {} failed rows, {} bytes",
            entries.len(),
            failures.len(),
            bytes.len()
        );
        Ok(Archive {
            bytes,
            entries,
            failures,
        })
    }

    /// Write the added entries and return the ZIP bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(Error::NoRows);
        }
        self.write().map(|(bytes, _)| bytes)
    }

    fn write(mut self) -> Result<(Vec<u8>, Vec<String>)> {
        // stable sort: row order, then insertion order
        self.entries.sort_by_key(|(row, _)| *row);

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_time(self.options.modified));

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut names = Vec::with_capacity(self.entries.len());
        for (_, entry) in self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.bytes)?;
            names.push(entry.name);
        }
        let cursor = writer.finish()?;
        Ok((cursor.into_inner(), names))
    }
}

/// Entry timestamp; ZIP cannot represent dates before 1980.
fn zip_time(modified: Option<NaiveDateTime>) -> zip::DateTime {
    modified
        .and_then(|dt| {
            zip::DateTime::from_date_and_time(
                u16::try_from(dt.year()).ok()?,
                dt.month() as u8,
                dt.day() as u8,
                dt.hour() as u8,
                dt.minute() as u8,
                dt.second() as u8,
            )
            .ok()
        })
        .unwrap_or_default()
}
