//! sheetmap - declarative mapping between typed records and spreadsheets
//!
//! Each record type declares an ordered list of column descriptors. From
//! that schema the library generates blank spreadsheet templates with one
//! horizontal block per record type, and loads filled-in workbooks back into
//! typed repositories.
//!
//! # Features
//!
//! - Column coercions for text, integers, numbers, booleans, dates and optional values
//! - Header blocks found at any column offset, rows read until the first blank row
//! - Row exclusion values, required/not-null checks, custom and whole-record validators
//! - xlsx templates and exports via rust_xlsxwriter, reading via calamine
//! - YAML layout files for tables defined at runtime
//!
//! # Example
//!
//! ```no_run
//! use sheetmap::column::{integer, text};
//! use sheetmap::schema::{Record, Schema};
//! use sheetmap::workbook::{MappedWorkbook, SheetSpec};
//! use std::path::Path;
//!
//! #[derive(Debug, Default)]
//! struct Car {
//!     make: String,
//!     year: i64,
//! }
//!
//! impl Record for Car {
//!     const NAME: &'static str = "Car";
//!
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::builder()
//!             .column("make", text().header("Make").required(), |c| &c.make, |c| &mut c.make)
//!             .column("year", integer().header("Year").required(), |c| &c.year, |c| &mut c.year)
//!             .build()
//!     }
//! }
//!
//! let mut book = MappedWorkbook::new(vec![SheetSpec::new("Cars").record::<Car>()])?;
//! book.generate_template(Path::new("cars_template.xlsx"))?;
//!
//! book.load_data(Path::new("cars.xlsx"))?;
//! for car in book.repository::<Car>().into_iter().flatten() {
//!     println!("{} {}", car.make, car.year);
//! }
//! # Ok::<(), sheetmap::error::MappingError>(())
//! ```

pub mod binding;
pub mod cli;
pub mod column;
pub mod config;
pub mod core;
pub mod dynamic;
pub mod error;
pub mod excel;
pub mod naming;
pub mod repository;
pub mod schema;
pub mod types;
pub mod workbook;

// Re-export commonly used types
pub use error::{MappingError, MappingResult};
pub use repository::Repository;
pub use schema::{Record, Schema};
pub use types::CellValue;
pub use workbook::{LoadReport, MappedWorkbook, SheetSpec};
