//! Template layout: titles, headers and column widths for each block

use crate::error::MappingResult;
use crate::excel::{CellStyle, SheetSink};
use crate::types::CellValue;
use tracing::debug;

const MIN_COLUMN_WIDTH: usize = 12;
const MAX_COLUMN_WIDTH: usize = 40;
const COLUMN_PADDING: usize = 4;

/// Row numbers and spacing shared by every block on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetRows {
    pub title_row: u32,
    pub header_row: u32,
    pub data_start_row: u32,
    /// Empty columns between consecutive blocks.
    pub block_gap: u32,
}

impl Default for SheetRows {
    fn default() -> Self {
        Self {
            title_row: 1,
            header_row: 2,
            data_start_row: 3,
            block_gap: 2,
        }
    }
}

/// What a block needs for layout: its title and header labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub title: String,
    pub labels: Vec<String>,
}

/// Where a block landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlacement {
    pub title: String,
    pub start_column: u32,
    pub width: u32,
}

impl BlockPlacement {
    pub fn end_column(&self) -> u32 {
        self.start_column + self.width.saturating_sub(1)
    }
}

/// Display width for a header: label length plus padding, clamped to 12..=40.
pub fn column_width(label: &str) -> f64 {
    let width = (label.chars().count() + COLUMN_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
    width as f64
}

/// Block placements, left to right from column 1.
pub fn plan_blocks(blocks: &[BlockTemplate], block_gap: u32) -> Vec<BlockPlacement> {
    let mut current = 1u32;
    blocks
        .iter()
        .map(|block| {
            let width = block.labels.len() as u32;
            let placement = BlockPlacement {
                title: block.title.clone(),
                start_column: current,
                width,
            };
            current += width + block_gap;
            placement
        })
        .collect()
}

/// Write every block's title, headers and column widths. No data rows are
/// written.
pub fn layout_sheet(
    sink: &mut dyn SheetSink,
    rows: &SheetRows,
    blocks: &[BlockTemplate],
) -> MappingResult<Vec<BlockPlacement>> {
    let placements = plan_blocks(blocks, rows.block_gap);

    for (block, placement) in blocks.iter().zip(&placements) {
        debug!(
            title = %placement.title,
            start_column = placement.start_column,
            width = placement.width,
            "laying out block"
        );

        if placement.width > 1 {
            sink.merge_cells(
                rows.title_row,
                placement.start_column,
                rows.title_row,
                placement.end_column(),
                &placement.title,
                CellStyle::TITLE,
            )?;
        } else {
            sink.write_cell(
                rows.title_row,
                placement.start_column,
                &CellValue::from(placement.title.as_str()),
                CellStyle::TITLE,
            )?;
        }

        for (column, label) in (placement.start_column..).zip(&block.labels) {
            sink.write_cell(
                rows.header_row,
                column,
                &CellValue::from(label.as_str()),
                CellStyle::HEADER,
            )?;
            sink.set_column_width(column, column_width(label))?;
        }
    }

    Ok(placements)
}
