//! rust_xlsxwriter backend: writing templates and data exports

use crate::error::{MappingError, MappingResult};
use crate::excel::{CellStyle, SheetSink, WorkbookSink};
use crate::types::CellValue;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

fn export_error(e: XlsxError) -> MappingError {
    MappingError::Export(e.to_string())
}

/// rust_xlsxwriter uses 0-based u32 rows and u16 columns.
fn position(row: u32, column: u32) -> MappingResult<(u32, u16)> {
    if row == 0 || column == 0 {
        return Err(MappingError::Export(format!(
            "cell ({}, {}) is outside the sheet",
            row, column
        )));
    }
    let column = u16::try_from(column - 1)
        .map_err(|_| MappingError::Export(format!("column {} is out of range", column)))?;
    Ok((row - 1, column))
}

fn cell_format(style: CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if style.centered {
        format = format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    format
}

impl SheetSink for Worksheet {
    fn write_cell(
        &mut self,
        row: u32,
        column: u32,
        value: &CellValue,
        style: CellStyle,
    ) -> MappingResult<()> {
        let (row, column) = position(row, column)?;
        let format = cell_format(style);
        match value {
            CellValue::Empty => {
                if style != CellStyle::PLAIN {
                    self.write_blank(row, column, &format).map_err(export_error)?;
                }
            }
            CellValue::Text(s) | CellValue::Error(s) => {
                self.write_string_with_format(row, column, s, &format)
                    .map_err(export_error)?;
            }
            CellValue::Int(i) => {
                self.write_number_with_format(row, column, *i as f64, &format)
                    .map_err(export_error)?;
            }
            CellValue::Float(f) => {
                self.write_number_with_format(row, column, *f, &format)
                    .map_err(export_error)?;
            }
            CellValue::Bool(b) => {
                self.write_boolean_with_format(row, column, *b, &format)
                    .map_err(export_error)?;
            }
            CellValue::Date(d) => {
                let format = format.set_num_format(DATE_FORMAT);
                self.write_datetime_with_format(row, column, d, &format)
                    .map_err(export_error)?;
            }
            CellValue::DateTime(dt) => {
                let format = format.set_num_format(DATETIME_FORMAT);
                self.write_datetime_with_format(row, column, dt, &format)
                    .map_err(export_error)?;
            }
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
        let (first_row, first_column) = position(first_row, first_column)?;
        let (last_row, last_column) = position(last_row, last_column)?;
        self.merge_range(
            first_row,
            first_column,
            last_row,
            last_column,
            text,
            &cell_format(style),
        )
        .map_err(export_error)?;
        Ok(())
    }

    fn set_column_width(&mut self, column: u32, width: f64) -> MappingResult<()> {
        let (_, column) = position(1, column)?;
        Worksheet::set_column_width(self, column, width).map_err(export_error)?;
        Ok(())
    }
}

impl WorkbookSink for Workbook {
    fn add_sheet(&mut self, name: &str) -> MappingResult<&mut dyn SheetSink> {
        let worksheet = self.add_worksheet();
        worksheet.set_name(name).map_err(export_error)?;
        Ok(worksheet)
    }
}
