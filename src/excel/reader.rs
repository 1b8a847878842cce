//! calamine backend: reading existing workbooks

use crate::error::{MappingError, MappingResult};
use crate::excel::{SheetSource, WorkbookSource};
use crate::types::CellValue;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Open any workbook format calamine recognises by extension.
pub fn open_workbook_file(path: &Path) -> MappingResult<Sheets<BufReader<File>>> {
    open_workbook_auto(path).map_err(|e| {
        MappingError::Workbook(format!("Failed to open '{}': {}", path.display(), e))
    })
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => CellValue::Float(dt.as_f64()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => native_date_value(value),
                None => CellValue::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => iso_date_value(s),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

/// Midnight date-times are date-only cells.
fn native_date_value(value: NaiveDateTime) -> CellValue {
    if value.time() == chrono::NaiveTime::MIN {
        CellValue::Date(value.date())
    } else {
        CellValue::DateTime(value)
    }
}

fn iso_date_value(s: &str) -> CellValue {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(date);
    }
    match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(value) => native_date_value(value),
        Err(_) => CellValue::Text(s.to_string()),
    }
}

/// A worksheet range. calamine ranges start at the first used cell, so
/// lookups use absolute positions.
impl SheetSource for Range<Data> {
    fn cell(&self, row: u32, column: u32) -> CellValue {
        if row == 0 || column == 0 {
            return CellValue::Empty;
        }
        self.get_value((row - 1, column - 1))
            .map(CellValue::from)
            .unwrap_or_default()
    }

    fn max_row(&self) -> u32 {
        self.end().map_or(0, |(row, _)| row + 1)
    }

    fn max_column(&self) -> u32 {
        self.end().map_or(0, |(_, column)| column + 1)
    }
}

impl<RS: Read + Seek> WorkbookSource for Sheets<RS> {
    fn sheet_names(&self) -> Vec<String> {
        Reader::sheet_names(self)
    }

    fn read_sheet(&mut self, name: &str) -> MappingResult<Box<dyn SheetSource>> {
        let range = self.worksheet_range(name).map_err(|e| {
            MappingError::Workbook(format!("Failed to read sheet '{}': {}", name, e))
        })?;
        Ok(Box::new(range))
    }
}
