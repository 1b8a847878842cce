//! In-memory workbook

use crate::error::{MappingError, MappingResult};
use crate::excel::{CellStyle, SheetSink, SheetSource, WorkbookSink, WorkbookSource};
use crate::types::CellValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRange {
    pub first_row: u32,
    pub first_column: u32,
    pub last_row: u32,
    pub last_column: u32,
}

/// Sparse sheet keyed by 1-based (row, column).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    cells: BTreeMap<(u32, u32), CellValue>,
    styles: BTreeMap<(u32, u32), CellStyle>,
    merges: Vec<MergedRange>,
    widths: BTreeMap<u32, f64>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value. Writing `Empty` removes the cell.
    pub fn set(&mut self, row: u32, column: u32, value: impl Into<CellValue>) {
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(row, column));
        } else {
            self.cells.insert((row, column), value);
        }
    }

    /// Write `rows` starting at (row, column), one vector per sheet row.
    pub fn set_rows(&mut self, row: u32, column: u32, rows: Vec<Vec<CellValue>>) {
        for (r, values) in (row..).zip(rows) {
            for (c, value) in (column..).zip(values) {
                self.set(r, c, value);
            }
        }
    }

    pub fn style(&self, row: u32, column: u32) -> CellStyle {
        self.styles.get(&(row, column)).copied().unwrap_or_default()
    }

    pub fn merges(&self) -> &[MergedRange] {
        &self.merges
    }

    pub fn column_width(&self, column: u32) -> Option<f64> {
        self.widths.get(&column).copied()
    }
}

impl SheetSource for MemorySheet {
    fn cell(&self, row: u32, column: u32) -> CellValue {
        self.cells.get(&(row, column)).cloned().unwrap_or_default()
    }

    fn max_row(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }

    fn max_column(&self) -> u32 {
        self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0)
    }
}

impl SheetSink for MemorySheet {
    fn write_cell(
        &mut self,
        row: u32,
        column: u32,
        value: &CellValue,
        style: CellStyle,
    ) -> MappingResult<()> {
        self.set(row, column, value.clone());
        if style != CellStyle::PLAIN {
            self.styles.insert((row, column), style);
        }
        Ok(())
    }

    fn merge_cells(
        &mut self,
        first_row: u32,
        first_column: u32,
        last_row: u32,
        last_column: u32,
        text: &str,
        style: CellStyle,
    ) -> MappingResult<()> {
        if first_row == last_row && first_column == last_column {
            return Err(MappingError::Export(
                "a merged range needs more than one cell".to_string(),
            ));
        }
        self.merges.push(MergedRange {
            first_row,
            first_column,
            last_row,
            last_column,
        });
        self.write_cell(first_row, first_column, &CellValue::from(text), style)
    }

    fn set_column_width(&mut self, column: u32, width: f64) -> MappingResult<()> {
        self.widths.insert(column, width);
        Ok(())
    }
}

/// Named sheets in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, MemorySheet)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sheet.
    pub fn insert_sheet(&mut self, name: impl Into<String>, sheet: MemorySheet) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = sheet,
            None => self.sheets.push((name, sheet)),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut MemorySheet> {
        self.sheets
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn remove_sheet(&mut self, name: &str) -> Option<MemorySheet> {
        let pos = self.sheets.iter().position(|(n, _)| n == name)?;
        Some(self.sheets.remove(pos).1)
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> MappingResult<Box<dyn SheetSource>> {
        self.sheet(name)
            .map(|s| Box::new(s.clone()) as Box<dyn SheetSource>)
            .ok_or_else(|| MappingError::MissingSheet(name.to_string()))
    }
}

impl WorkbookSink for MemoryWorkbook {
    fn add_sheet(&mut self, name: &str) -> MappingResult<&mut dyn SheetSink> {
        if self.sheet(name).is_some() {
            return Err(MappingError::Export(format!(
                "sheet '{}' already exists",
                name
            )));
        }
        self.sheets.push((name.to_string(), MemorySheet::new()));
        match self.sheets.last_mut() {
            Some((_, sheet)) => Ok(sheet),
            None => Err(MappingError::Export(format!("cannot add sheet '{}'", name))),
        }
    }
}
