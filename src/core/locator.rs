//! Header block location

use crate::excel::SheetSource;
use tracing::debug;

/// A located (or positionally assumed) block of columns on a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    pub row: u32,
    pub start_column: u32,
    pub width: u32,
}

impl HeaderBlock {
    /// Sheet columns covered by the block, left to right.
    pub fn columns(&self) -> Vec<u32> {
        (self.start_column..self.start_column + self.width).collect()
    }
}

/// Find the first run of columns on `header_row` whose normalized labels
/// equal `expected`, in order. `None` when nothing matches.
pub fn locate_header(
    sheet: &dyn SheetSource,
    header_row: u32,
    expected: &[String],
) -> Option<HeaderBlock> {
    let width = u32::try_from(expected.len()).ok()?;
    let max_column = sheet.max_column();
    if width == 0 || max_column < width {
        return None;
    }

    let expected: Vec<&str> = expected.iter().map(|label| label.trim()).collect();
    let found = (1..=max_column - width + 1).find(|&start| {
        expected
            .iter()
            .zip(start..)
            .all(|(label, column)| sheet.cell(header_row, column).normalized() == *label)
    });

    match found {
        Some(start_column) => {
            debug!(header_row, start_column, width, "header block located");
            Some(HeaderBlock {
                row: header_row,
                start_column,
                width,
            })
        }
        None => None,
    }
}
