//! Source records as read from a spreadsheet.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A raw cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Text cell
    Text(String),

    /// Whole number
    Integer(i64),

    /// Floating point number
    Float(f64),

    /// Boolean cell
    Bool(bool),

    /// Calendar date without time
    Date(NaiveDate),

    /// Date with time of day
    DateTime(NaiveDateTime),

    /// Time of day without a date
    Time(NaiveTime),

    /// Cell the source could not interpret (e.g. `#DIV/0!`)
    Invalid(String),

    /// Missing value
    Empty,
}

impl Value {
    /// Check whether the value counts as missing.
    ///
    /// `NaN` and blank text are treated as missing, matching how
    /// spreadsheet readers usually represent blank cells.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Float(f) => f.is_nan(),
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Short type name, used in log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
            Value::Invalid(_) => "invalid",
            Value::Empty => "empty",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Empty)
    }
}

/// One source row as an ordered column → value mapping.
///
/// Column names are unique within a record; inserting an existing name
/// replaces its value in place and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// Insert or replace a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Look up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Column names in source order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(column, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A record together with its 1-based position in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    /// 1-based data row number (the header row is not counted)
    pub row: usize,

    /// The row's values
    pub record: Record,
}

impl SourceRow {
    /// Create a new source row.
    pub fn new(row: usize, record: Record) -> Self {
        Self { row, record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_order() {
        let record = Record::from_pairs([
            ("Name", Value::from("John Doe")),
            ("Age", Value::from(30i64)),
            ("Department", Value::from("IT")),
        ]);
        let columns: Vec<_> = record.columns().collect();
        assert_eq!(columns, vec!["Name", "Age", "Department"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_record_insert_replaces() {
        let mut record = Record::new();
        record.insert("a", 1i64);
        record.insert("b", 2i64);
        record.insert("a", 3i64);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&Value::Integer(3)));
        assert_eq!(record.columns().next(), Some("a"));
    }

    #[test]
    fn test_value_missing() {
        assert!(Value::Empty.is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Float(1.5).is_missing());
        assert!(Value::Text("  ".to_string()).is_missing());
        assert!(!Value::Text("0".to_string()).is_missing());
        assert!(Value::from(None::<i64>).is_missing());
    }
}
