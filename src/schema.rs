//! Record schemas
//!
//! A record type lists its columns once, in declaration order, through
//! [`Schema::builder`]. That order drives header matching, block width, row
//! cell positions and template column order.
//!
//! # Example
//!
//! ```
//! use sheetmap::column::{integer, text};
//! use sheetmap::schema::{Record, Schema};
//!
//! #[derive(Debug, Default)]
//! struct Car {
//!     make: String,
//!     year: i64,
//! }
//!
//! impl Record for Car {
//!     const NAME: &'static str = "Car";
//!
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::builder()
//!             .column("make", text().header("Make").not_null(), |c| &c.make, |c| &mut c.make)
//!             .column("year", integer().header("Year"), |c| &c.year, |c| &mut c.year)
//!             .build()
//!     }
//! }
//!
//! assert_eq!(Car::schema().labels(), vec!["Make", "Year"]);
//! ```

use crate::column::{ColumnDescriptor, ColumnType};
use crate::error::{FieldError, MappingError, MappingResult};
use crate::types::CellValue;
use std::collections::HashSet;

/// A typed record that maps onto one block of a sheet.
pub trait Record: Default + 'static {
    /// Base type name, e.g. `ManufacturingPlant`. Repository and display
    /// names derive from it.
    const NAME: &'static str;

    /// Ordered column bindings. Called once when the type is registered.
    fn schema() -> Schema<Self>;

    /// Whole-record check run after every field is set. The default accepts
    /// everything.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

//==============================================================================
// Field bindings
//==============================================================================

/// One column of a schema with its value type erased.
pub trait FieldBinding<R> {
    /// Field name on the record.
    fn name(&self) -> &str;

    /// Header label: the declared header, or the field name.
    fn label(&self) -> &str;

    /// 0-based positional fallback.
    fn index(&self) -> Option<usize>;

    /// True when `raw` is in this column's exclusion set.
    fn is_excluded(&self, raw: &CellValue) -> bool;

    /// Write the column default into a fresh record, without validation.
    fn apply_default(&self, record: &mut R);

    /// Parse `raw`, validate, and store it.
    fn assign(&self, record: &mut R, raw: &CellValue) -> Result<(), FieldError>;

    /// Current field value rendered for a sheet.
    fn render(&self, record: &R) -> CellValue;
}

/// A [`ColumnDescriptor`] bound to a field of `R` through an accessor pair.
pub struct BoundColumn<R, T> {
    name: String,
    descriptor: ColumnDescriptor<T>,
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T: ColumnType> BoundColumn<R, T> {
    pub fn new(
        name: impl Into<String>,
        descriptor: ColumnDescriptor<T>,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            get,
            get_mut,
        }
    }

    pub fn descriptor(&self) -> &ColumnDescriptor<T> {
        &self.descriptor
    }

    pub fn get<'a>(&self, record: &'a R) -> &'a T {
        (self.get)(record)
    }

    /// Validate, then commit.
    pub fn set(&self, record: &mut R, value: T) -> Result<(), FieldError> {
        self.descriptor.validate(&self.name, &value)?;
        *(self.get_mut)(record) = value;
        Ok(())
    }
}

impl<R, T: ColumnType> FieldBinding<R> for BoundColumn<R, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        self.descriptor.header_label().unwrap_or(&self.name)
    }

    fn index(&self) -> Option<usize> {
        self.descriptor.position()
    }

    fn is_excluded(&self, raw: &CellValue) -> bool {
        self.descriptor.is_excluded(raw)
    }

    fn apply_default(&self, record: &mut R) {
        if let Some(value) = self.descriptor.initial_value() {
            *(self.get_mut)(record) = value.clone();
        }
    }

    fn assign(&self, record: &mut R, raw: &CellValue) -> Result<(), FieldError> {
        let value = self.descriptor.parse(&self.name, raw)?;
        self.set(record, value)
    }

    fn render(&self, record: &R) -> CellValue {
        self.descriptor.render(self.get(record))
    }
}

//==============================================================================
// Schema
//==============================================================================

/// Ordered column bindings for one record type.
pub struct Schema<R> {
    columns: Vec<Box<dyn FieldBinding<R>>>,
}

impl<R: 'static> Schema<R> {
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder {
            columns: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Box<dyn FieldBinding<R>>] {
        &self.columns
    }

    /// Block width.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Header labels in schema order.
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label().to_string()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&dyn FieldBinding<R>> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
    }

    /// Sheet columns (1-based) for a positional read, available only when
    /// every column declares an index.
    pub fn positional_columns(&self) -> Option<Vec<u32>> {
        if self.columns.is_empty() {
            return None;
        }
        self.columns
            .iter()
            .map(|c| c.index().and_then(|i| u32::try_from(i + 1).ok()))
            .collect()
    }

    /// Parse and set a single field by name, running its validation.
    pub fn set_field(
        &self,
        record: &mut R,
        type_name: &str,
        name: &str,
        raw: &CellValue,
    ) -> MappingResult<()> {
        let column = self.field(name).ok_or_else(|| {
            MappingError::Schema(format!("{} has no field '{}'", type_name, name))
        })?;
        column
            .assign(record, raw)
            .map_err(|e| e.into_mapping_error(name, format!("{}.{}", type_name, name)))
    }

    /// Render every field of `record` in schema order.
    pub fn render(&self, record: &R) -> Vec<CellValue> {
        self.columns.iter().map(|c| c.render(record)).collect()
    }

    /// Registration-time checks: at least one column, unique field names.
    pub fn check(&self, type_name: &str) -> MappingResult<()> {
        if self.columns.is_empty() {
            return Err(MappingError::Schema(format!(
                "{} declares no columns",
                type_name
            )));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name()) {
                return Err(MappingError::Schema(format!(
                    "{} declares field '{}' more than once",
                    type_name,
                    column.name()
                )));
            }
        }
        Ok(())
    }
}

impl<R: Default + 'static> Schema<R> {
    /// A record holding each column's default.
    pub fn new_record(&self) -> R {
        let mut record = R::default();
        for column in &self.columns {
            column.apply_default(&mut record);
        }
        record
    }
}

pub struct SchemaBuilder<R> {
    columns: Vec<Box<dyn FieldBinding<R>>>,
}

impl<R: 'static> SchemaBuilder<R> {
    /// Append a typed column bound to a field through its accessor pair.
    #[must_use]
    pub fn column<T: ColumnType>(
        mut self,
        name: impl Into<String>,
        descriptor: ColumnDescriptor<T>,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        self.columns
            .push(Box::new(BoundColumn::new(name, descriptor, get, get_mut)));
        self
    }

    /// Append an already type-erased binding.
    #[must_use]
    pub fn binding(mut self, binding: Box<dyn FieldBinding<R>>) -> Self {
        self.columns.push(binding);
        self
    }

    pub fn build(self) -> Schema<R> {
        Schema {
            columns: self.columns,
        }
    }
}
