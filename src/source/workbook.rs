//! Workbook reader (xlsx, xlsm, xlsb, xls, ods) backed by calamine.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{build_rows, unique_headers, TabularSource};
use crate::error::{Error, Result};
use crate::model::{SourceRow, Value};

/// Spreadsheet workbook reader.
///
/// Reads the first worksheet unless a sheet name is configured. The first
/// row of the used range is the header.
#[derive(Debug, Clone, Default)]
pub struct WorkbookSource {
    sheet: Option<String>,
}

impl WorkbookSource {
    /// Create a reader for the first worksheet.
    pub fn new() -> Self {
        Self { sheet: None }
    }

    /// Read a named worksheet instead of the first one.
    pub fn with_sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }
}

impl TabularSource for WorkbookSource {
    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xlsm", "xlsb", "xls", "ods"]
    }

    fn name(&self) -> &str {
        "workbook"
    }

    fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<SourceRow>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let range = match self.sheet {
            Some(ref name) => workbook.worksheet_range(name)?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| Error::UnreadableFile("the workbook has no worksheets".into()))??,
        };

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| Error::UnreadableFile("the worksheet is empty".into()))?;
        let headers = unique_headers(header.iter().map(|c| c.to_string()));

        build_rows(
            &headers,
            rows.map(|cells| cells.iter().map(cell_value).collect()),
        )
    }
}

/// Convert a calamine cell to a [`Value`].
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(n) => Value::Integer(*n),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return Value::Float(dt.as_f64());
            }
            match dt.as_datetime() {
                // serials below one carry no date part
                Some(ndt) if (0.0..1.0).contains(&dt.as_f64()) => Value::Time(ndt.time()),
                Some(ndt) => date_or_datetime(ndt),
                None => Value::Invalid(format!("date serial {}", dt.as_f64())),
            }
        }
        Data::DateTimeIso(s) => parse_iso(s),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Invalid(e.to_string()),
    }
}

/// Midnight timestamps are plain dates.
fn date_or_datetime(ndt: NaiveDateTime) -> Value {
    if ndt.time() == NaiveTime::MIN {
        Value::Date(ndt.date())
    } else {
        Value::DateTime(ndt)
    }
}

fn parse_iso(s: &str) -> Value {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Value::Date(d);
    }
    match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(ndt) => date_or_datetime(ndt),
        Err(_) => Value::Text(s.to_string()),
    }
}
