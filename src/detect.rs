//! Spreadsheet format detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Tabular file formats the library can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Office Open XML workbook (xlsx, xlsm) or OpenDocument (ods); ZIP container
    Workbook,
    /// Legacy binary Excel workbook (xls); OLE compound file
    LegacyWorkbook,
    /// Delimited UTF-8 text
    Csv,
}

impl SheetFormat {
    /// Extension of the registered reader for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            SheetFormat::Workbook => "xlsx",
            SheetFormat::LegacyWorkbook => "xls",
            SheetFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetFormat::Workbook => write!(f, "workbook"),
            SheetFormat::LegacyWorkbook => write!(f, "legacy workbook"),
            SheetFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// ZIP local file header: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// OLE compound file header
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// Bytes inspected when deciding whether data is text.
const SNIFF_LEN: usize = 4096;

/// Detect the format of a file on disk.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SheetFormat> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the format from the leading bytes of a file.
///
/// # Returns
/// * `Err(Error::UnreadableFile)` for empty data and for binary data that is
///   not a known workbook container
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SheetFormat> {
    if data.is_empty() {
        return Err(Error::UnreadableFile("the file is empty".to_string()));
    }
    if data.starts_with(ZIP_MAGIC) {
        return Ok(SheetFormat::Workbook);
    }
    if data.starts_with(OLE_MAGIC) {
        return Ok(SheetFormat::LegacyWorkbook);
    }
    if looks_like_text(&data[..data.len().min(SNIFF_LEN)]) {
        return Ok(SheetFormat::Csv);
    }
    Err(Error::UnreadableFile(
        "not a spreadsheet or CSV file".to_string(),
    ))
}

/// UTF-8 (a multi-byte sequence may be cut at the sniff boundary) without NUL bytes.
fn looks_like_text(data: &[u8]) -> bool {
    if data.contains(&0) {
        return false;
    }
    match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && e.valid_up_to() + 4 > data.len(),
    }
}

/// Check if bytes look like a supported spreadsheet.
pub fn is_spreadsheet_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
