//! CSV / TSV reader.
//!
//! The first record is the header. Cells are typed by inspection: integers,
//! floats, booleans and ISO dates are recognized, tokens from the common NA
//! set (`NA`, `N/A`, `null`, ...) are read as missing, anything else is text.

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;

use super::{build_rows, unique_headers, TabularSource};
use crate::error::{Error, Result};
use crate::model::{SourceRow, Value};

/// Tokens that denote a missing value.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Delimited text reader.
#[derive(Debug, Clone)]
pub struct CsvSource {
    delimiter: u8,
    infer_types: bool,
    extensions: &'static [&'static str],
    name: &'static str,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvSource {
    /// Create a comma-separated reader.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            infer_types: true,
            extensions: &["csv"],
            name: "csv",
        }
    }

    /// Create a tab-separated reader.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            extensions: &["tsv", "tab"],
            name: "tsv",
            ..Self::new()
        }
    }

    /// Set a custom delimiter character.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enable or disable type inference (disabled = every cell is text).
    pub fn with_type_inference(mut self, infer: bool) -> Self {
        self.infer_types = infer;
        self
    }

    fn parse_cell(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        if NA_TOKENS.contains(&trimmed) {
            return Value::Empty;
        }
        if !self.infer_types {
            return Value::Text(raw.to_string());
        }
        infer_value(trimmed).unwrap_or_else(|| Value::Text(raw.to_string()))
    }
}

/// Recognize typed values; `None` means plain text.
fn infer_value(s: &str) -> Option<Value> {
    if s.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if s.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(Value::Integer(n));
    }
    // "inf" and "nan" parse as f64; only digit-bearing tokens count as numbers
    if s.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Some(Value::Float(f));
            }
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Value::Date(d));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Value::DateTime(dt));
        }
    }
    None
}

impl TabularSource for CsvSource {
    fn supported_extensions(&self) -> &[&str] {
        self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<SourceRow>> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| Error::UnreadableFile(format!("failed to read CSV header: {}", e)))?;
        let headers = unique_headers(headers.iter());

        let mut cells = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                Error::UnreadableFile(format!("malformed CSV record {}: {}", index + 1, e))
            })?;
            cells.push(record.iter().map(|c| self.parse_cell(c)).collect());
        }

        build_rows(&headers, cells)
    }
}
