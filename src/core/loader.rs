//! Row loading for one located block

use crate::error::{MappingError, MappingResult};
use crate::excel::{cell_reference, column_letter, SheetSource};
use crate::repository::Repository;
use crate::schema::Schema;
use crate::types::CellValue;
use tracing::debug;

/// Where a block's data lives.
pub struct BlockSource<'a> {
    pub sheet: &'a dyn SheetSource,
    pub sheet_name: &'a str,
    /// Sheet column per schema column, in schema order.
    pub columns: &'a [u32],
    pub data_start_row: u32,
}

/// Outcome of loading one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub excluded: usize,
}

/// Scan rows from `data_start_row` down until the first row that is blank
/// across the whole block, building one record per surviving row.
///
/// Rows with an excluded raw value are skipped. The first parse or
/// validation failure aborts the scan.
pub fn load_rows<R: Default + 'static>(
    source: &BlockSource<'_>,
    schema: &Schema<R>,
    validate: impl Fn(&R) -> Result<(), String>,
    repository: &mut Repository<R>,
) -> MappingResult<LoadStats> {
    if source.columns.len() != schema.len() {
        return Err(MappingError::Schema(format!(
            "block on '{}' has {} columns but the schema declares {}",
            source.sheet_name,
            source.columns.len(),
            schema.len()
        )));
    }

    let mut stats = LoadStats::default();
    let max_row = source.sheet.max_row();
    let mut row = source.data_start_row;

    while row <= max_row {
        let raw: Vec<CellValue> = source
            .columns
            .iter()
            .map(|&column| source.sheet.cell(row, column))
            .collect();

        if raw.iter().all(CellValue::is_blank) {
            debug!(sheet = source.sheet_name, row, "blank row ends block");
            break;
        }

        let excluded = schema
            .columns()
            .iter()
            .zip(&raw)
            .any(|(column, value)| column.is_excluded(value));
        if excluded {
            debug!(sheet = source.sheet_name, row, "row excluded");
            stats.excluded += 1;
            row += 1;
            continue;
        }

        let mut record = schema.new_record();
        for ((column, value), &sheet_column) in
            schema.columns().iter().zip(&raw).zip(source.columns)
        {
            column.assign(&mut record, value).map_err(|e| {
                e.into_mapping_error(
                    column.name(),
                    cell_reference(source.sheet_name, row, sheet_column),
                )
            })?;
        }

        validate(&record).map_err(|message| MappingError::Validation {
            location: row_reference(source, row),
            message,
        })?;

        repository.push(record);
        stats.loaded += 1;
        row += 1;
    }

    Ok(stats)
}

/// `Cars!A4:C4` for a whole block row.
fn row_reference(source: &BlockSource<'_>, row: u32) -> String {
    match (source.columns.first(), source.columns.last()) {
        (Some(&first), Some(&last)) if first != last => format!(
            "{}:{}{}",
            cell_reference(source.sheet_name, row, first),
            column_letter(last),
            row
        ),
        (Some(&first), _) => cell_reference(source.sheet_name, row, first),
        _ => format!("{}!{}", source.sheet_name, row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{integer, text};
    use crate::excel::MemorySheet;
    use crate::schema::Record;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Car {
        make: String,
        model: String,
        year: i64,
    }

    impl Record for Car {
        const NAME: &'static str = "Car";

        fn schema() -> Schema<Self> {
            Schema::<Self>::builder()
                .column("make", text().header("Make").not_null(), |c| &c.make, |c| &mut c.make)
                .column("model", text().header("Model").exclude("N/A"), |c| &c.model, |c| &mut c.model)
                .column("year", integer().header("Year").required(), |c| &c.year, |c| &mut c.year)
                .build()
        }

        fn validate(&self) -> Result<(), String> {
            if self.make == "Ford" && self.year < 1903 {
                Err("Ford predates its own founding".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn car(make: &str, model: &str, year: i64) -> Car {
        Car {
            make: make.to_string(),
            model: model.to_string(),
            year,
        }
    }

    fn load(sheet: &MemorySheet, columns: &[u32]) -> MappingResult<(Vec<Car>, LoadStats)> {
        let source = BlockSource {
            sheet,
            sheet_name: "Cars",
            columns,
            data_start_row: 3,
        };
        let mut repo = Repository::new();
        let stats = load_rows(&source, &Car::schema(), Car::validate, &mut repo)?;
        Ok((repo.all().to_vec(), stats))
    }

    #[test]
    fn test_loads_until_blank_row() {
        let mut sheet = MemorySheet::new();
        sheet.set_rows(
            3,
            1,
            vec![
                vec!["Toyota".into(), "Camry".into(), 2020.0.into()],
                vec!["Honda".into(), "Civic".into(), "2019".into()],
                vec![CellValue::Empty, "  ".into(), CellValue::Empty],
                vec!["Mazda".into(), "3".into(), 2018_i64.into()],
            ],
        );

        let (cars, stats) = load(&sheet, &[1, 2, 3]).unwrap();
        assert_eq!(cars, vec![car("Toyota", "Camry", 2020), car("Honda", "Civic", 2019)]);
        assert_eq!(stats, LoadStats { loaded: 2, excluded: 0 });
    }

    #[test]
    fn test_excluded_rows_do_not_end_block() {
        let mut sheet = MemorySheet::new();
        sheet.set_rows(
            3,
            1,
            vec![
                vec!["Toyota".into(), "N/A".into(), "not a year".into()],
                vec!["Honda".into(), "Civic".into(), 2019_i64.into()],
            ],
        );

        let (cars, stats) = load(&sheet, &[1, 2, 3]).unwrap();
        assert_eq!(cars, vec![car("Honda", "Civic", 2019)]);
        assert_eq!(stats.excluded, 1);
    }

    #[test]
    fn test_parse_failure_reports_cell() {
        let mut sheet = MemorySheet::new();
        sheet.set_rows(3, 2, vec![vec!["Toyota".into(), "Camry".into(), "twenty".into()]]);

        match load(&sheet, &[2, 3, 4]).unwrap_err() {
            MappingError::Parse {
                location, column, raw, ..
            } => {
                assert_eq!(location, "Cars!D3");
                assert_eq!(column, "year");
                assert_eq!(raw, "\"twenty\"");
            }
            other => panic!("Expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_required_and_not_null_failures() {
        let mut sheet = MemorySheet::new();
        sheet.set_rows(3, 1, vec![vec!["Toyota".into(), "Camry".into()]]);
        let err = load(&sheet, &[1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("year is required"), "{err}");

        let mut sheet = MemorySheet::new();
        sheet.set_rows(3, 1, vec![vec![" ".into(), "Camry".into(), 2020_i64.into()]]);
        let err = load(&sheet, &[1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("make cannot be null/empty"), "{err}");
    }

    #[test]
    fn test_record_validation_aborts() {
        let mut sheet = MemorySheet::new();
        sheet.set_rows(3, 1, vec![vec!["Ford".into(), "Quadricycle".into(), 1896_i64.into()]]);

        match load(&sheet, &[1, 2, 3]).unwrap_err() {
            MappingError::Validation { location, message } => {
                assert_eq!(location, "Cars!A3:C3");
                assert_eq!(message, "Ford predates its own founding");
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_sheet_loads_nothing() {
        let (cars, stats) = load(&MemorySheet::new(), &[1, 2, 3]).unwrap();
        assert!(cars.is_empty());
        assert_eq!(stats, LoadStats::default());
    }

    #[test]
    fn test_column_count_mismatch_is_schema_error() {
        let err = load(&MemorySheet::new(), &[1, 2]).unwrap_err();
        assert!(matches!(err, MappingError::Schema(_)));
    }
}
