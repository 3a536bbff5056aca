//! Record normalization: raw values → labelled display strings.
//!
//! Normalization is total. Every column of the input produces exactly one
//! [`NormalizedField`], in order. Missing values become the configured
//! missing marker; values that cannot be coerced become the error marker and
//! are logged, and the rest of the record is still processed.

mod options;

pub use options::{NormalizeOptions, DEFAULT_ERROR_MARKER, DEFAULT_MISSING_MARKER};

use std::fmt::Write;

use crate::error::FieldCoercionError;
use crate::model::{NormalizedField, Record, SourceRow, Value};

/// Normalize a record with default options.
pub fn normalize(record: &Record) -> Vec<NormalizedField> {
    RecordNormalizer::default().normalize(record)
}

/// Converts records into ordered normalized fields.
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    options: NormalizeOptions,
}

impl RecordNormalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize a record. Never fails; output length equals column count.
    pub fn normalize(&self, record: &Record) -> Vec<NormalizedField> {
        self.normalize_inner(record, None)
    }

    /// Normalize a source row; identical to [`normalize`](Self::normalize)
    /// except that coercion warnings carry the row number.
    pub fn normalize_row(&self, row: &SourceRow) -> Vec<NormalizedField> {
        self.normalize_inner(&row.record, Some(row.row))
    }

    fn normalize_inner(&self, record: &Record, row: Option<usize>) -> Vec<NormalizedField> {
        record
            .iter()
            .map(|(column, value)| {
                let label = humanize_label(column);
                if value.is_missing() {
                    return NormalizedField::missing(column, label, &self.options.missing_marker);
                }
                match self.coerce(column, value) {
                    Ok(text) => NormalizedField::new(column, label, text),
                    Err(e) => {
                        match row {
                            Some(row) => log::warn!("row {}: {}", row, e),
                            None => log::warn!("{}", e),
                        }
                        NormalizedField::error(column, label, &self.options.error_marker)
                    }
                }
            })
            .collect()
    }

    /// Coerce a present value to its canonical string form.
    pub fn coerce(&self, column: &str, value: &Value) -> Result<String, FieldCoercionError> {
        let fail = |reason: String| FieldCoercionError {
            column: column.to_string(),
            reason,
        };

        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(f) if f.is_finite() => Ok(format_float(*f)),
            Value::Float(f) => Err(fail(format!("non-finite number {}", f))),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Date(d) => {
                let mut out = String::new();
                write!(out, "{}", d.format(&self.options.date_format))
                    .map_err(|_| fail(format!("bad date format {:?}", self.options.date_format)))?;
                Ok(out)
            }
            Value::DateTime(dt) => {
                let mut out = String::new();
                write!(out, "{}", dt.format(&self.options.datetime_format)).map_err(|_| {
                    fail(format!(
                        "bad datetime format {:?}",
                        self.options.datetime_format
                    ))
                })?;
                Ok(out)
            }
            Value::Time(t) => {
                let mut out = String::new();
                write!(out, "{}", t.format(&self.options.time_format))
                    .map_err(|_| fail(format!("bad time format {:?}", self.options.time_format)))?;
                Ok(out)
            }
            Value::Invalid(reason) => Err(fail(format!("source cell error {}", reason))),
            Value::Empty => Ok(self.options.missing_marker.clone()),
        }
    }
}

/// Shortest round-trip decimal form; integral floats print without a
/// fractional part (`30.0` → `30`).
fn format_float(f: f64) -> String {
    if f == 0.0 {
        // normalizes -0.0
        return "0".to_string();
    }
    f.to_string()
}

/// Turn a column name into a display label.
///
/// `_` and `-` become word breaks, runs of separators collapse, and each
/// word is title-cased (`customer_ID` → `Customer Id`, `STATUS` → `Status`).
pub fn humanize_label(column: &str) -> String {
    let words: Vec<String> = column
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        let trimmed = column.trim();
        return if trimmed.is_empty() {
            "Unnamed".to_string()
        } else {
            trimmed.to_string()
        };
    }
    words.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_humanize_label() {
        assert_eq!(humanize_label("affected_product"), "Affected Product");
        assert_eq!(humanize_label("batch-number"), "Batch Number");
        assert_eq!(humanize_label("In Stock"), "In Stock");
        assert_eq!(humanize_label("customer_ID"), "Customer Id");
        assert_eq!(humanize_label("STATUS"), "Status");
        assert_eq!(humanize_label("__a__b__"), "A B");
        assert_eq!(humanize_label("Discount %"), "Discount %");
        assert_eq!(humanize_label("___"), "___");
        assert_eq!(humanize_label(""), "Unnamed");
    }

    #[test]
    fn test_coerce_values() {
        let n = RecordNormalizer::default();
        assert_eq!(n.coerce("a", &Value::Integer(30)).unwrap(), "30");
        assert_eq!(n.coerce("a", &Value::Float(30.0)).unwrap(), "30");
        assert_eq!(n.coerce("a", &Value::Float(19.99)).unwrap(), "19.99");
        assert_eq!(n.coerce("a", &Value::Float(-0.0)).unwrap(), "0");
        assert_eq!(n.coerce("a", &Value::Bool(true)).unwrap(), "True");
        assert_eq!(n.coerce("a", &Value::Bool(false)).unwrap(), "False");
        let d = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(n.coerce("a", &Value::Date(d)).unwrap(), "2024-01-09");
        let dt = d.and_hms_opt(8, 5, 0).unwrap();
        assert_eq!(
            n.coerce("a", &Value::DateTime(dt)).unwrap(),
            "2024-01-09 08:05:00"
        );
        let t = chrono::NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(n.coerce("a", &Value::Time(t)).unwrap(), "08:30:00");
    }

    #[test]
    fn test_coerce_failures() {
        let n = RecordNormalizer::default();
        assert!(n.coerce("a", &Value::Float(f64::INFINITY)).is_err());
        let err = n.coerce("ratio", &Value::Invalid("#DIV/0!".into())).unwrap_err();
        assert_eq!(err.column, "ratio");
    }

    #[test]
    fn test_bad_date_format_is_contained() {
        let n = RecordNormalizer::new(NormalizeOptions::new().with_date_format("%Q"));
        let record = Record::from_pairs([
            ("when", Value::Date(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap())),
            ("who", Value::from("Ann")),
        ]);
        let fields = n.normalize(&record);
        assert_eq!(fields.len(), 2);
        assert!(fields[0].is_error);
        assert_eq!(fields[0].value, DEFAULT_ERROR_MARKER);
        assert_eq!(fields[1].value, "Ann");
    }

    #[test]
    fn test_normalize_scenario() {
        let record = Record::from_pairs([
            ("Name", Value::from("John Doe")),
            ("Age", Value::from(30i64)),
            ("Department", Value::from("IT")),
        ]);
        let fields = normalize(&record);
        let lines: Vec<_> = fields.iter().map(|f| f.summary_line()).collect();
        assert_eq!(lines, vec!["Name: John Doe", "Age: 30", "Department: IT"]);
    }

    #[test]
    fn test_missing_values_are_visible() {
        let record = Record::from_pairs([
            ("category", Value::Empty),
            ("price", Value::Float(f64::NAN)),
            ("notes", Value::from("   ")),
        ]);
        let fields = normalize(&record);
        assert_eq!(fields.len(), 3);
        for field in &fields {
            assert!(field.is_missing);
            assert_eq!(field.value, DEFAULT_MISSING_MARKER);
        }
    }
}
