//! Sheet specifications and the mapped workbook
//!
//! A [`MappedWorkbook`] owns the sheet layout and one repository per record
//! type. It generates blank templates, loads filled-in workbooks and exports
//! the currently loaded records.

use crate::binding::{BindingKey, RecordBinding, SchemaBinding};
use crate::core::{layout_sheet, locate_header, BlockPlacement, BlockSource, BlockTemplate, SheetRows};
use crate::dynamic::DynamicRow;
use crate::error::{MappingError, MappingResult};
use crate::excel::{open_workbook_file, SheetSource, WorkbookSink, WorkbookSource};
use crate::repository::{AnyRepository, Repository};
use crate::schema::Record;
use rust_xlsxwriter::Workbook;
use std::any::TypeId;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

//==============================================================================
// Sheet specification
//==============================================================================

/// One sheet: its name, row numbers, and the record blocks placed on it left
/// to right.
pub struct SheetSpec {
    name: String,
    rows: SheetRows,
    bindings: Vec<Box<dyn RecordBinding>>,
}

impl std::fmt::Debug for SheetSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<&str> = self.bindings.iter().map(|b| b.type_name()).collect();
        f.debug_struct("SheetSpec")
            .field("name", &self.name)
            .field("rows", &self.rows)
            .field("bindings", &types)
            .finish()
    }
}

impl SheetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: SheetRows::default(),
            bindings: Vec::new(),
        }
    }

    /// Place a compile-time record type as the next block.
    #[must_use]
    pub fn record<R: Record>(self) -> Self {
        self.binding(Box::new(SchemaBinding::<R>::record()))
    }

    #[must_use]
    pub fn binding(mut self, binding: Box<dyn RecordBinding>) -> Self {
        self.bindings.push(binding);
        self
    }

    #[must_use]
    pub fn title_row(mut self, row: u32) -> Self {
        self.rows.title_row = row;
        self
    }

    #[must_use]
    pub fn header_row(mut self, row: u32) -> Self {
        self.rows.header_row = row;
        self
    }

    #[must_use]
    pub fn data_start_row(mut self, row: u32) -> Self {
        self.rows.data_start_row = row;
        self
    }

    #[must_use]
    pub fn block_gap(mut self, gap: u32) -> Self {
        self.rows.block_gap = gap;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &SheetRows {
        &self.rows
    }

    pub fn bindings(&self) -> &[Box<dyn RecordBinding>] {
        &self.bindings
    }

    /// Title and header labels per block, in placement order.
    pub fn block_templates(&self) -> Vec<BlockTemplate> {
        self.bindings
            .iter()
            .map(|b| BlockTemplate {
                title: b.display_name(),
                labels: b.labels(),
            })
            .collect()
    }

    /// Row numbering rules plus every block's schema checks.
    pub fn check(&self) -> MappingResult<()> {
        let rows = &self.rows;
        let invalid = |message: String| {
            Err(MappingError::Schema(format!("sheet '{}': {}", self.name, message)))
        };

        if self.name.trim().is_empty() {
            return invalid("sheet name is empty".to_string());
        }
        if rows.title_row == 0 || rows.header_row == 0 || rows.data_start_row == 0 {
            return invalid("row numbers start at 1".to_string());
        }
        if rows.title_row == rows.header_row {
            return invalid(format!(
                "title row and header row are both {}",
                rows.header_row
            ));
        }
        if rows.data_start_row <= rows.header_row {
            return invalid(format!(
                "data start row {} must be below header row {}",
                rows.data_start_row, rows.header_row
            ));
        }
        self.bindings.iter().try_for_each(|b| b.check())
    }
}

//==============================================================================
// Load report
//==============================================================================

/// How a block was found on its sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLocation {
    /// Header block matched, starting at this column
    Header(u32),
    /// Header absent, read through declared column indexes
    Positional,
    /// Header absent, block skipped
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    pub sheet: String,
    pub type_name: String,
    pub repository: String,
    pub location: BlockLocation,
    pub loaded: usize,
    pub excluded: usize,
}

/// Per-block outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub blocks: Vec<BlockReport>,
}

impl LoadReport {
    pub fn total_loaded(&self) -> usize {
        self.blocks.iter().map(|b| b.loaded).sum()
    }

    pub fn total_excluded(&self) -> usize {
        self.blocks.iter().map(|b| b.excluded).sum()
    }
}

//==============================================================================
// Mapped workbook
//==============================================================================

struct RepositorySlot {
    name: String,
    key: BindingKey,
    repository: Box<dyn AnyRepository>,
}

pub struct MappedWorkbook {
    sheets: Vec<SheetSpec>,
    slots: Vec<RepositorySlot>,
}

impl MappedWorkbook {
    /// Validate the layout and create one empty repository per record type.
    ///
    /// Fails with a schema error when two different record types derive the
    /// same repository name, before any file is touched.
    pub fn new(sheets: Vec<SheetSpec>) -> MappingResult<Self> {
        check_sheets(&sheets)?;

        let mut slots: Vec<RepositorySlot> = Vec::new();
        for binding in sheets.iter().flat_map(|s| s.bindings()) {
            let name = binding.repository_name();
            let key = binding.key();
            match slots.iter().find(|slot| slot.name == name) {
                Some(slot) if slot.key == key => {}
                Some(_) => {
                    return Err(MappingError::Schema(format!(
                        "duplicate repository name '{}' (from {})",
                        name,
                        binding.type_name()
                    )));
                }
                None => {
                    debug!(repository = %name, "registered repository");
                    slots.push(RepositorySlot {
                        name,
                        key,
                        repository: binding.new_repository(),
                    });
                }
            }
        }

        Ok(Self { sheets, slots })
    }

    pub fn sheets(&self) -> &[SheetSpec] {
        &self.sheets
    }

    /// Repository names in registration order.
    pub fn repository_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    /// The repository for record type `R`, if `R` is placed on any sheet.
    pub fn repository<R: Record>(&self) -> Option<&Repository<R>> {
        let key = BindingKey::Type(TypeId::of::<R>());
        self.slots
            .iter()
            .find(|s| s.key == key)
            .and_then(|s| s.repository.as_any().downcast_ref::<Repository<R>>())
    }

    /// Mutable access, e.g. to fill records before [`export_data`](Self::export_data).
    pub fn repository_mut<R: Record>(&mut self) -> Option<&mut Repository<R>> {
        let key = BindingKey::Type(TypeId::of::<R>());
        self.slots
            .iter_mut()
            .find(|s| s.key == key)
            .and_then(|s| s.repository.as_any_mut().downcast_mut::<Repository<R>>())
    }

    pub fn repository_named(&self, name: &str) -> Option<&dyn AnyRepository> {
        self.slot(name).map(|s| &*s.repository)
    }

    /// Rows of a runtime-defined table, by repository name.
    pub fn rows(&self, name: &str) -> Option<&[DynamicRow]> {
        self.slot(name)
            .and_then(|s| s.repository.as_any().downcast_ref::<Repository<DynamicRow>>())
            .map(Repository::all)
    }

    fn slot(&self, name: &str) -> Option<&RepositorySlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    fn slot_index(&self, key: &BindingKey) -> MappingResult<usize> {
        self.slots
            .iter()
            .position(|s| s.key == *key)
            .ok_or_else(|| MappingError::Schema(format!("no repository registered for {:?}", key)))
    }

    //--------------------------------------------------------------------------
    // Templates and export
    //--------------------------------------------------------------------------

    /// Write a blank template to `path`, overwriting any existing file.
    pub fn generate_template(&self, path: &Path) -> MappingResult<()> {
        info!(path = %path.display(), sheets = self.sheets.len(), "generating template");
        let mut workbook = Workbook::new();
        self.write_template(&mut workbook)?;
        save(&mut workbook, path)
    }

    /// Lay out every sheet on `sink`. Returns each sheet's block placements.
    pub fn write_template(
        &self,
        sink: &mut dyn WorkbookSink,
    ) -> MappingResult<Vec<(String, Vec<BlockPlacement>)>> {
        let mut layout = Vec::with_capacity(self.sheets.len());
        for spec in &self.sheets {
            let sheet = sink.add_sheet(spec.name())?;
            let placements = layout_sheet(sheet, spec.rows(), &spec.block_templates())?;
            layout.push((spec.name().to_string(), placements));
        }
        Ok(layout)
    }

    /// Write the template plus every repository's records to `path`.
    pub fn export_data(&self, path: &Path) -> MappingResult<()> {
        info!(path = %path.display(), "exporting data");
        let mut workbook = Workbook::new();
        self.write_data(&mut workbook)?;
        save(&mut workbook, path)
    }

    /// A record type placed on several sheets is written at its first
    /// placement only, so a reload does not duplicate its records.
    pub fn write_data(&self, sink: &mut dyn WorkbookSink) -> MappingResult<usize> {
        let mut written_keys = HashSet::new();
        let mut total = 0;
        for spec in &self.sheets {
            let sheet = sink.add_sheet(spec.name())?;
            let placements = layout_sheet(sheet, spec.rows(), &spec.block_templates())?;
            for (binding, placement) in spec.bindings().iter().zip(&placements) {
                let key = binding.key();
                if !written_keys.insert(key.clone()) {
                    continue;
                }
                let index = self.slot_index(&key)?;
                let columns: Vec<u32> =
                    (placement.start_column..=placement.end_column()).collect();
                total += binding.write_records(
                    sheet,
                    &columns,
                    spec.rows().data_start_row,
                    self.slots[index].repository.as_ref(),
                )?;
            }
        }
        Ok(total)
    }

    //--------------------------------------------------------------------------
    // Loading
    //--------------------------------------------------------------------------

    /// Open `path` and replace every repository's contents with its data.
    pub fn load_data(&mut self, path: &Path) -> MappingResult<LoadReport> {
        info!(path = %path.display(), "loading workbook");
        let mut source = open_workbook_file(path)?;
        self.load_from(&mut source)
    }

    /// Load from an already opened document.
    ///
    /// All or nothing: on any error every repository keeps its previous
    /// contents.
    pub fn load_from(&mut self, source: &mut dyn WorkbookSource) -> MappingResult<LoadReport> {
        let available = source.sheet_names();
        if let Some(missing) = self
            .sheets
            .iter()
            .find(|spec| !available.iter().any(|n| n == spec.name()))
        {
            return Err(MappingError::MissingSheet(missing.name().to_string()));
        }

        let mut staged: Vec<Box<dyn AnyRepository>> =
            self.slots.iter().map(|s| s.repository.fresh()).collect();
        let mut report = LoadReport::default();

        for spec in &self.sheets {
            let sheet = source.read_sheet(spec.name())?;
            for binding in spec.bindings() {
                let index = self.slot_index(&binding.key())?;
                let block = load_block(spec, &**binding, &*sheet, staged[index].as_mut())?;
                report.blocks.push(block);
            }
        }

        for (slot, repository) in self.slots.iter_mut().zip(staged) {
            slot.repository = repository;
        }
        info!(
            loaded = report.total_loaded(),
            excluded = report.total_excluded(),
            "workbook loaded"
        );
        Ok(report)
    }
}

fn check_sheets(sheets: &[SheetSpec]) -> MappingResult<()> {
    let mut names = HashSet::new();
    for spec in sheets {
        if !names.insert(spec.name()) {
            return Err(MappingError::Schema(format!(
                "sheet '{}' is declared more than once",
                spec.name()
            )));
        }
        spec.check()?;
    }
    Ok(())
}

fn load_block(
    spec: &SheetSpec,
    binding: &dyn RecordBinding,
    sheet: &dyn SheetSource,
    repository: &mut dyn AnyRepository,
) -> MappingResult<BlockReport> {
    let mut report = BlockReport {
        sheet: spec.name().to_string(),
        type_name: binding.type_name().to_string(),
        repository: binding.repository_name(),
        location: BlockLocation::NotFound,
        loaded: 0,
        excluded: 0,
    };

    let columns = match locate_header(sheet, spec.rows().header_row, &binding.labels()) {
        Some(block) => {
            report.location = BlockLocation::Header(block.start_column);
            block.columns()
        }
        None => match binding.positional_columns() {
            Some(columns) => {
                debug!(sheet = spec.name(), record = binding.type_name(), "header not found, reading by index");
                report.location = BlockLocation::Positional;
                columns
            }
            None => {
                debug!(sheet = spec.name(), record = binding.type_name(), "header not found, block skipped");
                return Ok(report);
            }
        },
    };

    let source = BlockSource {
        sheet,
        sheet_name: spec.name(),
        columns: &columns,
        data_start_row: spec.rows().data_start_row,
    };
    let stats = binding.load_block(&source, repository)?;
    debug!(
        sheet = spec.name(),
        record = binding.type_name(),
        loaded = stats.loaded,
        excluded = stats.excluded,
        "block loaded"
    );
    report.loaded = stats.loaded;
    report.excluded = stats.excluded;
    Ok(report)
}

fn save(workbook: &mut Workbook, path: &Path) -> MappingResult<()> {
    workbook
        .save(path)
        .map_err(|e| MappingError::Export(format!("Failed to save '{}': {}", path.display(), e)))
}
