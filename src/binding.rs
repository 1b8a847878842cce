//! Record types registered on a sheet, with their record type erased
//!
//! The workbook holds one [`RecordBinding`] per block. Compile-time records
//! and runtime-defined tables both go through [`SchemaBinding`].

use crate::core::{load_rows, BlockSource, LoadStats};
use crate::error::{MappingError, MappingResult};
use crate::excel::{CellStyle, SheetSink};
use crate::naming;
use crate::repository::{AnyRepository, Repository};
use crate::schema::{Record, Schema};
use std::any::TypeId;

/// Identity of the record type behind a binding. Two bindings with the same
/// key share one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    Type(TypeId),
    Table(String),
}

pub trait RecordBinding {
    fn key(&self) -> BindingKey;

    /// Base type name, e.g. `ManufacturingPlant`.
    fn type_name(&self) -> &str;

    fn repository_name(&self) -> String {
        naming::repository_name(self.type_name())
    }

    fn display_name(&self) -> String {
        naming::display_name(self.type_name())
    }

    /// Header labels in schema order.
    fn labels(&self) -> Vec<String>;

    fn positional_columns(&self) -> Option<Vec<u32>>;

    fn check(&self) -> MappingResult<()>;

    fn new_repository(&self) -> Box<dyn AnyRepository>;

    /// Append the block's rows to `repository`.
    fn load_block(
        &self,
        source: &BlockSource<'_>,
        repository: &mut dyn AnyRepository,
    ) -> MappingResult<LoadStats>;

    /// Write every record in `repository` from `data_start_row` down.
    fn write_records(
        &self,
        sink: &mut dyn SheetSink,
        columns: &[u32],
        data_start_row: u32,
        repository: &dyn AnyRepository,
    ) -> MappingResult<usize>;
}

type RecordCheck<R> = fn(&R) -> Result<(), String>;

/// A [`Schema`] plus the name, identity and whole-record check of its type.
pub struct SchemaBinding<R> {
    type_name: String,
    key: BindingKey,
    schema: Schema<R>,
    validate: RecordCheck<R>,
}

impl<R: Record> SchemaBinding<R> {
    /// Binding for a compile-time record type. Builds the schema once.
    pub fn record() -> Self {
        Self {
            type_name: R::NAME.to_string(),
            key: BindingKey::Type(TypeId::of::<R>()),
            schema: R::schema(),
            validate: R::validate,
        }
    }
}

impl<R: Default + 'static> SchemaBinding<R> {
    pub fn new(
        type_name: impl Into<String>,
        key: BindingKey,
        schema: Schema<R>,
        validate: RecordCheck<R>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            key,
            schema,
            validate,
        }
    }

    pub fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    fn downcast<'a>(&self, repository: &'a dyn AnyRepository) -> MappingResult<&'a Repository<R>> {
        repository
            .as_any()
            .downcast_ref::<Repository<R>>()
            .ok_or_else(|| self.mismatch())
    }

    fn downcast_mut<'a>(
        &self,
        repository: &'a mut dyn AnyRepository,
    ) -> MappingResult<&'a mut Repository<R>> {
        repository
            .as_any_mut()
            .downcast_mut::<Repository<R>>()
            .ok_or_else(|| self.mismatch())
    }

    fn mismatch(&self) -> MappingError {
        MappingError::Schema(format!(
            "repository '{}' does not hold {} records",
            self.repository_name(),
            self.type_name
        ))
    }
}

impl<R: Default + 'static> RecordBinding for SchemaBinding<R> {
    fn key(&self) -> BindingKey {
        self.key.clone()
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn labels(&self) -> Vec<String> {
        self.schema.labels()
    }

    fn positional_columns(&self) -> Option<Vec<u32>> {
        self.schema.positional_columns()
    }

    fn check(&self) -> MappingResult<()> {
        self.schema.check(&self.type_name)
    }

    fn new_repository(&self) -> Box<dyn AnyRepository> {
        Box::new(Repository::<R>::new())
    }

    fn load_block(
        &self,
        source: &BlockSource<'_>,
        repository: &mut dyn AnyRepository,
    ) -> MappingResult<LoadStats> {
        let repository = self.downcast_mut(repository)?;
        load_rows(source, &self.schema, self.validate, repository)
    }

    fn write_records(
        &self,
        sink: &mut dyn SheetSink,
        columns: &[u32],
        data_start_row: u32,
        repository: &dyn AnyRepository,
    ) -> MappingResult<usize> {
        let repository = self.downcast(repository)?;
        for (row, record) in (data_start_row..).zip(repository.iter()) {
            for (&column, value) in columns.iter().zip(self.schema.render(record)) {
                sink.write_cell(row, column, &value, CellStyle::PLAIN)?;
            }
        }
        Ok(repository.len())
    }
}
