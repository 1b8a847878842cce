//! YAML layout files
//!
//! A layout declares sheets and runtime tables so the engine can run without
//! compile-time record types:
//!
//! ```yaml
//! sheets:
//!   - name: Cars
//!     tables:
//!       - name: Car
//!         columns:
//!           - { field: make, header: Make, not_null: true }
//!           - { field: year, header: Year, type: integer, excludes: ["N/A"] }
//! ```

use crate::dynamic::{table_binding, ColumnKind, DynamicColumn};
use crate::error::{MappingError, MappingResult};
use crate::types::CellValue;
use crate::workbook::SheetSpec;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutFile {
    pub sheets: Vec<SheetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetConfig {
    pub name: String,
    #[serde(default = "default_title_row")]
    pub title_row: u32,
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_data_start_row")]
    pub data_start_row: u32,
    #[serde(default = "default_block_gap")]
    pub block_gap: u32,
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDef {
    /// Base type name; the repository name derives from it.
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    pub field: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_strip")]
    pub strip: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub excludes: Vec<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub index: Option<usize>,
}

fn default_title_row() -> u32 {
    1
}

fn default_header_row() -> u32 {
    2
}

fn default_data_start_row() -> u32 {
    3
}

fn default_block_gap() -> u32 {
    2
}

fn default_strip() -> bool {
    true
}

/// Read and build a layout file.
pub fn load_layout(path: &Path) -> MappingResult<Vec<SheetSpec>> {
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), "parsing layout");
    parse_layout(&content)
}

pub fn parse_layout(content: &str) -> MappingResult<Vec<SheetSpec>> {
    let layout: LayoutFile = serde_yaml::from_str(content)?;
    layout.sheets.iter().map(SheetConfig::to_spec).collect()
}

impl SheetConfig {
    pub fn to_spec(&self) -> MappingResult<SheetSpec> {
        let mut spec = SheetSpec::new(self.name.as_str())
            .title_row(self.title_row)
            .header_row(self.header_row)
            .data_start_row(self.data_start_row)
            .block_gap(self.block_gap);
        for table in &self.tables {
            let columns = table
                .columns
                .iter()
                .map(|c| c.to_column(&table.name))
                .collect::<MappingResult<Vec<_>>>()?;
            spec = spec.binding(Box::new(table_binding(&table.name, columns)));
        }
        Ok(spec)
    }
}

impl ColumnDef {
    fn to_column(&self, table: &str) -> MappingResult<DynamicColumn> {
        let location = format!("{}.{}", table, self.field);
        let mut descriptor = self.kind.descriptor(self.optional, self.strip);

        if let Some(header) = &self.header {
            descriptor = descriptor.header(header.as_str());
        }
        if let Some(index) = self.index {
            descriptor = descriptor.index(index);
        }
        if self.required {
            descriptor = descriptor.required();
        }
        if self.not_null {
            descriptor = descriptor.not_null();
        }
        for raw in &self.excludes {
            descriptor = descriptor.exclude(yaml_to_cell(raw, &location)?);
        }
        if let Some(raw) = &self.default {
            let raw = yaml_to_cell(raw, &location)?;
            let value = descriptor.parse(&self.field, &raw).map_err(|e| {
                MappingError::Schema(format!("default for {}: {}", location, e))
            })?;
            descriptor = descriptor.default_value(value);
        }

        Ok(DynamicColumn::new(self.field.as_str(), descriptor))
    }
}

/// Scalar YAML values only.
fn yaml_to_cell(value: &Value, location: &str) -> MappingResult<CellValue> {
    match value {
        Value::Null => Ok(CellValue::Empty),
        Value::Bool(b) => Ok(CellValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(CellValue::Int(i)),
            None => n.as_f64().map(CellValue::Float).ok_or_else(|| {
                MappingError::Schema(format!("{}: unsupported number {}", location, n))
            }),
        },
        Value::String(s) => Ok(CellValue::Text(s.clone())),
        other => Err(MappingError::Schema(format!(
            "{}: expected a scalar, got {:?}",
            location, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MappedWorkbook;

    const LAYOUT: &str = r#"
sheets:
  - name: Cars
    block_gap: 1
    tables:
      - name: Car
        columns:
          - { field: make, header: Make, not_null: true }
          - { field: year, header: Year, type: integer, excludes: ["N/A"], default: "1900" }
      - name: ManufacturingPlant
        columns:
          - { field: name, header: Factory Name }
          - { field: opened, type: date, optional: true }
"#;

    #[test]
    fn test_parse_layout_defaults_and_labels() {
        let specs = parse_layout(LAYOUT).unwrap();
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.rows().header_row, 2);
        assert_eq!(spec.rows().data_start_row, 3);
        assert_eq!(spec.rows().block_gap, 1);

        let templates = spec.block_templates();
        assert_eq!(templates[0].title, "Cars");
        assert_eq!(templates[0].labels, vec!["Make", "Year"]);
        assert_eq!(templates[1].title, "Manufacturing Plants");
        assert_eq!(templates[1].labels, vec!["Factory Name", "opened"]);

        let book = MappedWorkbook::new(specs).unwrap();
        assert_eq!(book.repository_names(), vec!["cars", "manufacturing_plants"]);
    }

    #[test]
    fn test_bad_default_is_schema_error() {
        let yaml = r#"
sheets:
  - name: Cars
    tables:
      - name: Car
        columns:
          - { field: year, type: integer, default: "soon" }
"#;
        match parse_layout(yaml) {
            Err(MappingError::Schema(message)) => assert!(message.contains("Car.year"), "{message}"),
            Err(other) => panic!("Expected Schema, got {other:?}"),
            Ok(_) => panic!("Expected failure"),
        }
    }

    #[test]
    fn test_unknown_keys_and_kinds_are_rejected() {
        let unknown_key = "sheets:\n  - name: A\n    colour: red\n";
        assert!(matches!(parse_layout(unknown_key), Err(MappingError::Yaml(_))));

        let unknown_kind = r#"
sheets:
  - name: A
    tables:
      - name: T
        columns:
          - { field: x, type: money }
"#;
        assert!(matches!(parse_layout(unknown_kind), Err(MappingError::Yaml(_))));
    }

    #[test]
    fn test_yaml_scalars() {
        assert_eq!(yaml_to_cell(&Value::from(3), "t").unwrap(), CellValue::Int(3));
        assert_eq!(yaml_to_cell(&Value::from(2.5), "t").unwrap(), CellValue::Float(2.5));
        assert_eq!(yaml_to_cell(&Value::Null, "t").unwrap(), CellValue::Empty);
        assert!(yaml_to_cell(&Value::Sequence(vec![]), "t").is_err());
    }
}
