//! Runtime-defined tables
//!
//! Tables declared in a layout file have no Rust type. Their rows load as
//! [`DynamicRow`]s: ordered field/value pairs whose values are already
//! coerced to the declared column kind.

use crate::binding::{BindingKey, SchemaBinding};
use crate::column::{ColumnDescriptor, ColumnType};
use crate::error::FieldError;
use crate::schema::{FieldBinding, Schema};
use crate::types::CellValue;
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// One loaded row of a runtime table, fields in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicRow {
    fields: Vec<(String, CellValue)>,
}

impl DynamicRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    /// Replace a field's value, appending the field if it is new.
    pub fn set(&mut self, field: &str, value: CellValue) {
        match self.fields.iter_mut().find(|(n, _)| n == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for DynamicRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Value kinds a runtime column can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Integer,
    Number,
    Boolean,
    Date,
}

impl ColumnKind {
    /// Descriptor producing cells of this kind. `optional` maps blank cells
    /// to `Empty`; `strip` only affects text.
    pub fn descriptor(self, optional: bool, strip: bool) -> ColumnDescriptor<CellValue> {
        match (self, optional) {
            (ColumnKind::Text, _) if !strip => {
                ColumnDescriptor::new().parser(move |raw: &CellValue| {
                    if optional && raw.is_empty() {
                        Ok(CellValue::Empty)
                    } else {
                        Ok(CellValue::Text(raw.to_string()))
                    }
                })
            }
            (ColumnKind::Text, false) => coerced::<String>(),
            (ColumnKind::Text, true) => coerced::<Option<String>>(),
            (ColumnKind::Integer, false) => coerced::<i64>(),
            (ColumnKind::Integer, true) => coerced::<Option<i64>>(),
            (ColumnKind::Number, false) => coerced::<f64>(),
            (ColumnKind::Number, true) => coerced::<Option<f64>>(),
            (ColumnKind::Boolean, false) => coerced::<bool>(),
            (ColumnKind::Boolean, true) => coerced::<Option<bool>>(),
            (ColumnKind::Date, false) => coerced::<NaiveDate>(),
            (ColumnKind::Date, true) => coerced::<Option<NaiveDate>>(),
        }
    }
}

fn coerced<T: ColumnType + Into<CellValue>>() -> ColumnDescriptor<CellValue> {
    ColumnDescriptor::new().parser(|raw: &CellValue| T::parse_cell(raw).map(Into::into))
}

/// A runtime column bound to a [`DynamicRow`] field.
pub struct DynamicColumn {
    name: String,
    descriptor: ColumnDescriptor<CellValue>,
}

impl DynamicColumn {
    pub fn new(name: impl Into<String>, descriptor: ColumnDescriptor<CellValue>) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

impl FieldBinding<DynamicRow> for DynamicColumn {
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

    /// Every field is present on a fresh row, in schema order.
    fn apply_default(&self, record: &mut DynamicRow) {
        let value = self.descriptor.initial_value().cloned().unwrap_or_default();
        record.set(&self.name, value);
    }

    fn assign(&self, record: &mut DynamicRow, raw: &CellValue) -> Result<(), FieldError> {
        let value = self.descriptor.parse(&self.name, raw)?;
        self.descriptor.validate(&self.name, &value)?;
        record.set(&self.name, value);
        Ok(())
    }

    fn render(&self, record: &DynamicRow) -> CellValue {
        record
            .get(&self.name)
            .map(|value| self.descriptor.render(value))
            .unwrap_or_default()
    }
}

/// Binding for a runtime table named `name`.
pub fn table_binding(name: &str, columns: Vec<DynamicColumn>) -> SchemaBinding<DynamicRow> {
    let schema = columns
        .into_iter()
        .fold(Schema::<DynamicRow>::builder(), |builder, column| {
            builder.binding(Box::new(column))
        })
        .build();
    SchemaBinding::new(name, BindingKey::Table(name.to_string()), schema, |_| Ok(()))
}
