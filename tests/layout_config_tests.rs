//! Layout file tests: runtime tables declared in YAML

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sheetmap::config::{load_layout, parse_layout};
use sheetmap::error::MappingError;
use sheetmap::excel::{MemorySheet, MemoryWorkbook};
use sheetmap::types::CellValue;
use sheetmap::workbook::{BlockLocation, MappedWorkbook};
use std::path::Path;
use tempfile::TempDir;

const LAYOUT: &str = "test-data/cars_layout.yaml";

fn book() -> MappedWorkbook {
    MappedWorkbook::new(load_layout(Path::new(LAYOUT)).unwrap()).unwrap()
}

/// A template for the layout with `fill` applied to its Cars sheet.
fn filled(book: &MappedWorkbook, fill: impl FnOnce(&mut MemorySheet)) -> MemoryWorkbook {
    let mut doc = MemoryWorkbook::new();
    book.write_template(&mut doc).unwrap();
    fill(doc.sheet_mut("Cars").unwrap());
    doc
}

// ═══════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_layout_file_builds_workbook() {
    let book = book();
    assert_eq!(
        book.repository_names(),
        vec!["cars", "manufacturing_plants", "dealers"]
    );
    assert_eq!(book.sheets()[1].rows().data_start_row, 3);
}

#[test]
fn test_missing_layout_file_is_io_error() {
    let err = load_layout(Path::new("test-data/does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, MappingError::Io(_)));
}

#[test]
fn test_invalid_rows_rejected_at_construction() {
    let specs = parse_layout(
        r#"
sheets:
  - name: Cars
    header_row: 4
    data_start_row: 4
    tables:
      - name: Car
        columns:
          - { field: make }
"#,
    )
    .unwrap();
    assert!(matches!(
        MappedWorkbook::new(specs),
        Err(MappingError::Schema(_))
    ));
}

#[test]
fn test_table_without_columns_rejected() {
    let specs = parse_layout("sheets:\n  - name: A\n    tables:\n      - { name: Empty, columns: [] }\n")
        .unwrap();
    assert!(matches!(
        MappedWorkbook::new(specs),
        Err(MappingError::Schema(_))
    ));
}

#[test]
fn test_duplicate_field_rejected() {
    let specs = parse_layout(
        r#"
sheets:
  - name: A
    tables:
      - name: Car
        columns:
          - { field: make }
          - { field: make, header: Brand }
"#,
    )
    .unwrap();
    assert!(matches!(
        MappedWorkbook::new(specs),
        Err(MappingError::Schema(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING RUNTIME TABLES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_template_filled_and_loaded() {
    let mut book = book();
    let mut doc = filled(&book, |sheet| {
        sheet.set_rows(
            3,
            1,
            vec![
                vec!["Toyota".into(), "Camry".into(), 2020.0.into()],
                vec!["Honda".into(), "Civic".into(), "2019".into()],
            ],
        );
        sheet.set_rows(
            3,
            6,
            vec![vec![
                "Georgetown".into(),
                "Kentucky".into(),
                "01-MAY-1988".into(),
                "y".into(),
            ]],
        );
    });
    doc.insert_sheet("Dealers", MemorySheet::new());

    let report = book.load_from(&mut doc).unwrap();
    assert_eq!(report.total_loaded(), 3);

    let cars = book.rows("cars").unwrap();
    assert_eq!(cars.len(), 2);
    assert_eq!(cars[1].get("year"), Some(&CellValue::Int(2019)));

    let plants = book.rows("manufacturing_plants").unwrap();
    assert_eq!(
        plants[0].get("opened"),
        Some(&CellValue::Date(NaiveDate::from_ymd_opt(1988, 5, 1).unwrap()))
    );
    assert_eq!(plants[0].get("active"), Some(&CellValue::Bool(true)));
}

#[test]
fn test_required_runtime_column() {
    let mut book = book();
    let mut doc = filled(&book, |sheet| {
        sheet.set_rows(3, 1, vec![vec!["Toyota".into(), "Camry".into()]]);
    });
    doc.insert_sheet("Dealers", MemorySheet::new());

    match book.load_from(&mut doc) {
        Err(MappingError::Validation { location, message }) => {
            assert_eq!(location, "Cars!C3");
            assert_eq!(message, "year is required");
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
}

#[test]
fn test_positional_fallback_with_exclusions() {
    let mut book = book();
    let mut doc = filled(&book, |_| {});
    let mut dealers = MemorySheet::new();
    dealers.set_rows(
        3,
        1,
        vec![
            vec!["Main St Motors".into(), "Osaka".into(), "OPEN".into()],
            vec!["Harbor Cars".into(), "Kobe".into(), "CLOSED".into()],
            vec!["Hilltop Auto".into(), "Nara".into(), "OPEN".into()],
        ],
    );
    doc.insert_sheet("Dealers", dealers);

    let report = book.load_from(&mut doc).unwrap();
    let dealer_block = report
        .blocks
        .iter()
        .find(|b| b.repository == "dealers")
        .unwrap();
    assert_eq!(dealer_block.location, BlockLocation::Positional);
    assert_eq!(dealer_block.excluded, 1);

    let cities: Vec<String> = book
        .rows("dealers")
        .unwrap()
        .iter()
        .filter_map(|r| r.get("city").map(|c| c.to_string()))
        .collect();
    assert_eq!(cities, vec!["Osaka", "Nara"]);
}

#[test]
fn test_real_template_file_from_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layout_template.xlsx");
    let mut book = book();
    book.generate_template(&path).unwrap();

    let report = book.load_data(&path).unwrap();
    assert_eq!(report.total_loaded(), 0);
    assert_eq!(report.blocks[0].location, BlockLocation::Header(1));
    assert_eq!(report.blocks[1].location, BlockLocation::Header(6));
    // Dealers carries headers too, so the header match wins over positions
    assert_eq!(report.blocks[2].location, BlockLocation::Header(1));
}
