//! Column type system
//!
//! A [`ColumnDescriptor`] is the immutable per-field configuration: header
//! label, positional index, default, required/not-null flags, raw exclusion
//! values, and the parse/render/validate functions. [`ColumnType`] supplies
//! the built-in coercions for text, integers, numbers, booleans, dates and
//! optional values.

pub mod dates;

use crate::error::FieldError;
use crate::types::CellValue;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

pub use dates::{parse_date, parse_date_str};

/// Values accepted for true/false in boolean columns (compared lower-cased).
const TRUE_WORDS: &[&str] = &["true", "t", "yes", "y", "1"];
const FALSE_WORDS: &[&str] = &["false", "f", "no", "n", "0"];

//==============================================================================
// Built-in coercions
//==============================================================================

/// A value type that can live in a mapped column.
pub trait ColumnType: Clone + 'static {
    /// Convert a raw cell into the typed value.
    fn parse_cell(raw: &CellValue) -> Result<Self, String>;

    /// Convert the typed value back into something a sheet can store.
    fn render_cell(value: &Self) -> CellValue;

    /// Null-or-empty test used by `not_null`.
    fn is_null(&self) -> bool {
        false
    }
}

impl ColumnType for String {
    /// `Empty` becomes "", everything else is stringified and trimmed.
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        Ok(raw.to_string().trim().to_string())
    }

    fn render_cell(value: &Self) -> CellValue {
        CellValue::Text(value.clone())
    }

    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

impl ColumnType for i64 {
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        match raw {
            CellValue::Empty => Ok(0),
            CellValue::Text(s) if s.is_empty() => Ok(0),
            CellValue::Int(i) => Ok(*i),
            CellValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Ok(*f as i64)
                } else {
                    Err(format!("invalid integer {}", f))
                }
            }
            CellValue::Bool(b) => Ok(i64::from(*b)),
            CellValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("invalid integer {:?}: {}", s, e)),
            other => Err(format!("invalid integer {}", other.describe())),
        }
    }

    fn render_cell(value: &Self) -> CellValue {
        CellValue::Int(*value)
    }
}

impl ColumnType for f64 {
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        match raw {
            CellValue::Empty => Ok(0.0),
            CellValue::Text(s) if s.is_empty() => Ok(0.0),
            CellValue::Int(i) => Ok(*i as f64),
            CellValue::Float(f) => Ok(*f),
            CellValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number {:?}: {}", s, e)),
            other => Err(format!("invalid number {}", other.describe())),
        }
    }

    fn render_cell(value: &Self) -> CellValue {
        CellValue::Float(*value)
    }
}

impl ColumnType for bool {
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        match raw {
            CellValue::Empty => Ok(false),
            CellValue::Text(s) if s.is_empty() => Ok(false),
            CellValue::Bool(b) => Ok(*b),
            other => {
                let word = other.to_string().trim().to_lowercase();
                if TRUE_WORDS.contains(&word.as_str()) {
                    Ok(true)
                } else if FALSE_WORDS.contains(&word.as_str()) {
                    Ok(false)
                } else {
                    Err(format!("invalid boolean {}", other.describe()))
                }
            }
        }
    }

    fn render_cell(value: &Self) -> CellValue {
        CellValue::Bool(*value)
    }
}

impl ColumnType for NaiveDate {
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        parse_date(raw)
    }

    fn render_cell(value: &Self) -> CellValue {
        CellValue::Date(*value)
    }
}

/// Blank cells become `None`; anything else goes through the inner coercion.
impl<T: ColumnType> ColumnType for Option<T> {
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        if raw.is_blank() {
            Ok(None)
        } else {
            T::parse_cell(raw).map(Some)
        }
    }

    fn render_cell(value: &Self) -> CellValue {
        value.as_ref().map_or(CellValue::Empty, T::render_cell)
    }

    fn is_null(&self) -> bool {
        self.as_ref().is_none_or(T::is_null)
    }
}

/// Identity coercion, used by runtime-defined tables that store parsed
/// values as cells.
impl ColumnType for CellValue {
    fn parse_cell(raw: &CellValue) -> Result<Self, String> {
        Ok(raw.clone())
    }

    fn render_cell(value: &Self) -> CellValue {
        value.clone()
    }

    fn is_null(&self) -> bool {
        self.is_blank()
    }
}

//==============================================================================
// Column descriptor
//==============================================================================

type ParseFn<T> = Arc<dyn Fn(&CellValue) -> Result<T, String> + Send + Sync>;
type RenderFn<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
type ValidateFn<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Immutable configuration for one field's spreadsheet mapping.
///
/// Built with the consuming setters below; every setter returns a new value.
pub struct ColumnDescriptor<T> {
    header: Option<String>,
    index: Option<usize>,
    default: Option<T>,
    required: bool,
    not_null: bool,
    excludes: Vec<CellValue>,
    parser: ParseFn<T>,
    renderer: RenderFn<T>,
    validator: Option<ValidateFn<T>>,
}

impl<T: Clone> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            index: self.index,
            default: self.default.clone(),
            required: self.required,
            not_null: self.not_null,
            excludes: self.excludes.clone(),
            parser: Arc::clone(&self.parser),
            renderer: Arc::clone(&self.renderer),
            validator: self.validator.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("header", &self.header)
            .field("index", &self.index)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("not_null", &self.not_null)
            .field("excludes", &self.excludes)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl<T: ColumnType> Default for ColumnDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ColumnType> ColumnDescriptor<T> {
    /// Descriptor using the type's built-in coercions.
    pub fn new() -> Self {
        Self {
            header: None,
            index: None,
            default: None,
            required: false,
            not_null: false,
            excludes: Vec::new(),
            parser: Arc::new(T::parse_cell),
            renderer: Arc::new(T::render_cell),
            validator: None,
        }
    }

    /// Validate a typed value: not-null first, then the custom validator.
    pub fn validate(&self, field: &str, value: &T) -> Result<(), FieldError> {
        if self.not_null && value.is_null() {
            return Err(FieldError::Invalid(format!(
                "{} cannot be null/empty",
                field
            )));
        }
        if let Some(validator) = &self.validator {
            validator(value).map_err(|message| {
                FieldError::Invalid(format!("{}: {}", field, message))
            })?;
        }
        Ok(())
    }
}

impl<T> ColumnDescriptor<T> {
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// 0-based positional fallback used when the header block is absent.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// The raw cell must be non-blank.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The parsed value must not be null or an empty string.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// A raw value that marks the whole row as excluded.
    #[must_use]
    pub fn exclude(mut self, raw: impl Into<CellValue>) -> Self {
        self.excludes.push(raw.into());
        self
    }

    #[must_use]
    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&CellValue) -> Result<T, String> + Send + Sync + 'static,
    {
        self.parser = Arc::new(parser);
        self
    }

    #[must_use]
    pub fn renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        self.renderer = Arc::new(renderer);
        self
    }

    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn header_label(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn position(&self) -> Option<usize> {
        self.index
    }

    pub fn initial_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn is_excluded(&self, raw: &CellValue) -> bool {
        self.excludes.iter().any(|value| value.matches(raw))
    }

    /// Raw → typed. A `required` column rejects blank cells before coercion.
    pub fn parse(&self, field: &str, raw: &CellValue) -> Result<T, FieldError> {
        if self.required && raw.is_blank() {
            return Err(FieldError::Invalid(format!("{} is required", field)));
        }
        (self.parser)(raw).map_err(|message| FieldError::Parse {
            raw: raw.describe(),
            message,
        })
    }

    pub fn render(&self, value: &T) -> CellValue {
        (self.renderer)(value)
    }
}

//==============================================================================
// Constructors
//==============================================================================

/// Any built-in column type.
pub fn column<T: ColumnType>() -> ColumnDescriptor<T> {
    ColumnDescriptor::new()
}

/// Trimmed text.
pub fn text() -> ColumnDescriptor<String> {
    ColumnDescriptor::new()
}

/// Text kept exactly as stringified.
pub fn raw_text() -> ColumnDescriptor<String> {
    ColumnDescriptor::new().parser(|raw: &CellValue| Ok(raw.to_string()))
}

pub fn integer() -> ColumnDescriptor<i64> {
    ColumnDescriptor::new()
}

pub fn number() -> ColumnDescriptor<f64> {
    ColumnDescriptor::new()
}

pub fn boolean() -> ColumnDescriptor<bool> {
    ColumnDescriptor::new()
}

pub fn date() -> ColumnDescriptor<NaiveDate> {
    ColumnDescriptor::new()
}

/// Blank cells load as `None`.
pub fn optional<T: ColumnType>() -> ColumnDescriptor<Option<T>> {
    ColumnDescriptor::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // COERCION TABLE
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_integer_coercion() {
        assert_eq!(i64::parse_cell(&CellValue::from("")), Ok(0));
        assert_eq!(i64::parse_cell(&CellValue::Empty), Ok(0));
        assert_eq!(i64::parse_cell(&CellValue::from("2019")), Ok(2019));
        assert_eq!(i64::parse_cell(&CellValue::from(" 42 ")), Ok(42));
        assert_eq!(i64::parse_cell(&CellValue::Float(2020.0)), Ok(2020));
        assert_eq!(i64::parse_cell(&CellValue::Int(-3)), Ok(-3));
        assert!(i64::parse_cell(&CellValue::from("twenty")).is_err());
        assert!(i64::parse_cell(&CellValue::Float(1.5)).is_err());
        assert!(i64::parse_cell(&CellValue::from("   ")).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(bool::parse_cell(&CellValue::from("Y")), Ok(true));
        assert_eq!(bool::parse_cell(&CellValue::from("yes")), Ok(true));
        assert_eq!(bool::parse_cell(&CellValue::from("TRUE")), Ok(true));
        assert_eq!(bool::parse_cell(&CellValue::from("0")), Ok(false));
        assert_eq!(bool::parse_cell(&CellValue::from("n")), Ok(false));
        assert_eq!(bool::parse_cell(&CellValue::Int(1)), Ok(true));
        assert_eq!(bool::parse_cell(&CellValue::Float(0.0)), Ok(false));
        assert_eq!(bool::parse_cell(&CellValue::Bool(true)), Ok(true));
        assert_eq!(bool::parse_cell(&CellValue::Empty), Ok(false));
        assert_eq!(bool::parse_cell(&CellValue::from("")), Ok(false));
        assert!(bool::parse_cell(&CellValue::from("maybe")).is_err());
    }

    #[test]
    fn test_date_coercion() {
        assert_eq!(
            NaiveDate::parse_cell(&CellValue::from("01-JUN-2025")),
            Ok(ymd(2025, 6, 1))
        );
        assert_eq!(
            NaiveDate::parse_cell(&CellValue::from("2025-06-01")),
            Ok(ymd(2025, 6, 1))
        );
        assert_eq!(
            NaiveDate::parse_cell(&CellValue::from("")),
            Err("empty date".to_string())
        );
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(String::parse_cell(&CellValue::Empty), Ok(String::new()));
        assert_eq!(
            String::parse_cell(&CellValue::from("  Camry ")),
            Ok("Camry".to_string())
        );
        assert_eq!(
            String::parse_cell(&CellValue::Float(2020.0)),
            Ok("2020".to_string())
        );
        let untrimmed = raw_text();
        assert_eq!(
            untrimmed.parse("note", &CellValue::from("  spaced ")),
            Ok("  spaced ".to_string())
        );
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(f64::parse_cell(&CellValue::Empty), Ok(0.0));
        assert_eq!(f64::parse_cell(&CellValue::from("2.5")), Ok(2.5));
        assert_eq!(f64::parse_cell(&CellValue::Int(4)), Ok(4.0));
        assert!(f64::parse_cell(&CellValue::from("abc")).is_err());
    }

    #[test]
    fn test_optional_coercion() {
        assert_eq!(Option::<NaiveDate>::parse_cell(&CellValue::Empty), Ok(None));
        assert_eq!(Option::<NaiveDate>::parse_cell(&CellValue::from("  ")), Ok(None));
        assert_eq!(
            Option::<NaiveDate>::parse_cell(&CellValue::from("2025-06-01")),
            Ok(Some(ymd(2025, 6, 1)))
        );
        assert!(Option::<i64>::parse_cell(&CellValue::from("x")).is_err());
        assert!(None::<i64>.is_null());
        assert!(Some(String::new()).is_null());
        assert!(!Some(3_i64).is_null());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DESCRIPTOR BEHAVIOUR
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_not_null_rejects_empty_string() {
        let make = text().header("Make").not_null();
        let err = make.validate("make", &String::new()).unwrap_err();
        assert_eq!(
            err,
            FieldError::Invalid("make cannot be null/empty".to_string())
        );
        assert!(make.validate("make", &"Toyota".to_string()).is_ok());
    }

    #[test]
    fn test_custom_validator() {
        let year = integer().validator(|y: &i64| {
            if *y >= 1886 {
                Ok(())
            } else {
                Err(format!("{} predates the automobile", y))
            }
        });
        assert!(year.validate("year", &2020).is_ok());
        let err = year.validate("year", &1700).unwrap_err();
        assert_eq!(
            err,
            FieldError::Invalid("year: 1700 predates the automobile".to_string())
        );
    }

    #[test]
    fn test_required_rejects_blank_raw_before_parsing() {
        let year = integer().required();
        assert_eq!(
            year.parse("year", &CellValue::Empty),
            Err(FieldError::Invalid("year is required".to_string()))
        );
        assert_eq!(year.parse("year", &CellValue::from("7")), Ok(7));
    }

    #[test]
    fn test_parse_failure_carries_raw() {
        let flag = boolean();
        match flag.parse("active", &CellValue::from("maybe")) {
            Err(FieldError::Parse { raw, .. }) => assert_eq!(raw, "\"maybe\""),
            other => panic!("Expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn test_exclusion_membership() {
        let status = text().exclude("N/A").exclude(0_i64);
        assert!(status.is_excluded(&CellValue::from("N/A")));
        assert!(status.is_excluded(&CellValue::Float(0.0)));
        assert!(!status.is_excluded(&CellValue::from("n/a")));
        assert!(!status.is_excluded(&CellValue::Empty));
    }

    #[test]
    fn test_custom_parser_and_renderer() {
        let upper = text()
            .parser(|raw: &CellValue| Ok(raw.to_string().to_uppercase()))
            .renderer(|v: &String| CellValue::Text(v.to_lowercase()));
        assert_eq!(upper.parse("code", &CellValue::from("abc")), Ok("ABC".to_string()));
        assert_eq!(upper.render(&"ABC".to_string()), CellValue::from("abc"));
    }
}
