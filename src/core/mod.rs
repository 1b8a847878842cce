//! Mapping engine: header location, row loading and template layout

pub mod loader;
pub mod locator;
pub mod template;

pub use loader::{load_rows, BlockSource, LoadStats};
pub use locator::{locate_header, HeaderBlock};
pub use template::{column_width, layout_sheet, plan_blocks, BlockPlacement, BlockTemplate, SheetRows};
