//! Spreadsheet document collaborators
//!
//! The mapping engine only talks to the traits below. Coordinates are 1-based
//! on both axes. Backends:
//! - [`reader`]: any workbook `calamine` can open (xlsx, xls, xlsb, ods)
//! - [`writer`]: `rust_xlsxwriter` workbooks
//! - [`memory`]: in-memory sheets for tests and embedding

pub mod memory;
pub mod reader;
pub mod writer;

use crate::error::MappingResult;
use crate::types::CellValue;

pub use memory::{MemorySheet, MemoryWorkbook, MergedRange};
pub use reader::open_workbook_file;

/// Emphasis applied to a written cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub centered: bool,
}

impl CellStyle {
    pub const PLAIN: CellStyle = CellStyle {
        bold: false,
        centered: false,
    };
    pub const HEADER: CellStyle = CellStyle {
        bold: true,
        centered: false,
    };
    pub const TITLE: CellStyle = CellStyle {
        bold: true,
        centered: true,
    };
}

/// Read access to one sheet.
pub trait SheetSource {
    /// Raw value at (row, column); `Empty` outside the used range.
    fn cell(&self, row: u32, column: u32) -> CellValue;

    /// Last used row, 0 for an empty sheet.
    fn max_row(&self) -> u32;

    /// Last used column, 0 for an empty sheet.
    fn max_column(&self) -> u32;
}

/// Write access to one sheet.
pub trait SheetSink {
    fn write_cell(
        &mut self,
        row: u32,
        column: u32,
        value: &CellValue,
        style: CellStyle,
    ) -> MappingResult<()>;

    /// Merge a rectangular range and write `text` into it.
    fn merge_cells(
        &mut self,
        first_row: u32,
        first_column: u32,
        last_row: u32,
        last_column: u32,
        text: &str,
        style: CellStyle,
    ) -> MappingResult<()>;

    /// Display width in character units.
    fn set_column_width(&mut self, column: u32, width: f64) -> MappingResult<()>;
}

/// An opened document that sheets can be read from.
pub trait WorkbookSource {
    fn sheet_names(&self) -> Vec<String>;
    fn read_sheet(&mut self, name: &str) -> MappingResult<Box<dyn SheetSource>>;
}

/// A document being built.
pub trait WorkbookSink {
    /// Create a sheet, in call order.
    fn add_sheet(&mut self, name: &str) -> MappingResult<&mut dyn SheetSink>;
}

/// Column letters for a 1-based column number: 1 → A, 27 → AA.
pub fn column_letter(column: u32) -> String {
    let mut result = String::new();
    let mut num = column;
    while num > 0 {
        let remainder = (num - 1) % 26;
        result.insert(0, char::from(b'A' + remainder as u8));
        num = (num - 1) / 26;
    }
    result
}

/// A1 reference with sheet prefix, e.g. `Cars!C4`.
pub fn cell_reference(sheet: &str, row: u32, column: u32) -> String {
    format!("{}!{}{}", sheet, column_letter(column), row)
}
