use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

//==============================================================================
// Raw cell values
//==============================================================================

/// A raw cell value as read from, or written to, a sheet.
///
/// Parsed record values of runtime-defined tables reuse this type, which is
/// why it serializes untagged (`Empty` becomes `null`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Native date-only value
    Date(NaiveDate),
    /// Native date-time value
    DateTime(NaiveDateTime),
    /// Spreadsheet error literal such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Header/blank-row normal form: `Empty` becomes "", everything else is
    /// stringified and trimmed.
    pub fn normalized(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        }
    }

    /// True when the value normalizes to an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Raw equality used by exclusion sets. Integers and floats compare
    /// numerically; every other pairing compares exactly.
    pub fn matches(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Int(a), CellValue::Float(b)) | (CellValue::Float(b), CellValue::Int(a)) => {
                (*a as f64) == *b
            }
            (a, b) => a == b,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            CellValue::Empty => "<empty>".to_string(),
            CellValue::Text(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(i64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}
