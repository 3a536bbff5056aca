//! Normalization options.

use serde::{Deserialize, Serialize};

/// Marker rendered for a missing value.
pub const DEFAULT_MISSING_MARKER: &str = "—";

/// Marker rendered when a value cannot be coerced.
pub const DEFAULT_ERROR_MARKER: &str = "[invalid value]";

/// Options controlling how raw values become strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Text shown for missing values (must be non-empty)
    pub missing_marker: String,

    /// Text shown for values that failed coercion
    pub error_marker: String,

    /// chrono format for dates
    pub date_format: String,

    /// chrono format for timestamps with a time of day
    pub datetime_format: String,

    /// chrono format for times of day
    pub time_format: String,
}

impl NormalizeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-value marker. Blank markers are ignored.
    pub fn with_missing_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.trim().is_empty() {
            self.missing_marker = marker;
        }
        self
    }

    /// Set the error marker. Blank markers are ignored.
    pub fn with_error_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.trim().is_empty() {
            self.error_marker = marker;
        }
        self
    }

    /// Set the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Set the datetime format.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// Set the time-of-day format.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            missing_marker: DEFAULT_MISSING_MARKER.to_string(),
            error_marker: DEFAULT_ERROR_MARKER.to_string(),
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            time_format: "%H:%M:%S".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_marker_ignored() {
        let options = NormalizeOptions::new().with_missing_marker("  ");
        assert_eq!(options.missing_marker, DEFAULT_MISSING_MARKER);

        let options = NormalizeOptions::new().with_missing_marker("n/a");
        assert_eq!(options.missing_marker, "n/a");
    }
}
