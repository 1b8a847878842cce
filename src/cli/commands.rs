use crate::config::load_layout;
use crate::core::{column_width, plan_blocks};
use crate::dynamic::DynamicRow;
use crate::error::{MappingError, MappingResult};
use crate::excel::column_letter;
use crate::workbook::{BlockLocation, LoadReport, MappedWorkbook};
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Build the mapped workbook described by a layout file
fn open_layout(layout: &Path, verbose: bool) -> MappingResult<MappedWorkbook> {
    if verbose {
        println!("{}", "📖 Reading layout...".cyan());
    }
    let specs = load_layout(layout)?;
    let book = MappedWorkbook::new(specs)?;
    if verbose {
        println!(
            "   Found {} sheets, {} repositories\n",
            book.sheets().len(),
            book.repository_names().len()
        );
    }
    Ok(book)
}

/// Execute the template command
pub fn template(layout: PathBuf, output: PathBuf, verbose: bool) -> MappingResult<()> {
    println!("{}", "📐 sheetmap - Template".bold().green());
    println!("   Layout: {}", layout.display());
    println!("   Output: {}\n", output.display());

    let book = open_layout(&layout, verbose)?;

    if verbose {
        println!("{}", "📊 Writing template...".cyan());
    }
    book.generate_template(&output)?;

    println!("{}", "✅ Template written".bold().green());
    for spec in book.sheets() {
        println!(
            "   📄 {}: {}",
            spec.name().bright_blue(),
            spec.block_templates()
                .iter()
                .map(|b| b.title.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!();
    Ok(())
}

/// Execute the load command
pub fn load(
    layout: PathBuf,
    data: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> MappingResult<()> {
    println!("{}", "📥 sheetmap - Load".bold().green());
    println!("   Layout: {}", layout.display());
    println!("   Data:   {}\n", data.display());

    let mut book = open_layout(&layout, verbose)?;

    if verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }
    let report = book.load_data(&data)?;
    print_report(&report);

    if let Some(path) = output {
        write_rows(&book, &path)?;
        println!("   Rows written to {}\n", path.display());
    }

    println!(
        "{}",
        format!("✅ Loaded {} records", report.total_loaded()).bold().green()
    );
    Ok(())
}

fn print_report(report: &LoadReport) {
    for block in &report.blocks {
        let location = match block.location {
            BlockLocation::Header(column) => format!("at column {}", column_letter(column)),
            BlockLocation::Positional => "by column index".to_string(),
            BlockLocation::NotFound => "header not found".yellow().to_string(),
        };
        println!(
            "   📊 {} / {} ({}): {} loaded, {} excluded",
            block.sheet.bright_blue(),
            block.type_name,
            location,
            block.loaded,
            block.excluded
        );
    }
    println!();
}

/// Serialize every runtime table as JSON or YAML, chosen by extension
fn write_rows(book: &MappedWorkbook, path: &Path) -> MappingResult<()> {
    let rows: BTreeMap<&str, &[DynamicRow]> = book
        .repository_names()
        .into_iter()
        .filter_map(|name| book.rows(name).map(|rows| (name, rows)))
        .collect();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let content = match extension.as_deref() {
        Some("json") => serde_json::to_string_pretty(&rows)
            .map_err(|e| MappingError::Export(format!("Failed to serialize JSON: {}", e)))?,
        Some("yaml") | Some("yml") => serde_yaml::to_string(&rows)?,
        _ => {
            return Err(MappingError::Export(format!(
                "Unsupported output format '{}' (use .json, .yaml or .yml)",
                path.display()
            )))
        }
    };
    fs::write(path, content)?;
    Ok(())
}

/// Execute the check command
pub fn check(layout: PathBuf) -> MappingResult<()> {
    println!("{}", "🔍 sheetmap - Layout Check".bold().green());
    println!("   Layout: {}\n", layout.display());

    let book = open_layout(&layout, false)?;

    for spec in book.sheets() {
        let rows = spec.rows();
        println!(
            "   📄 Sheet: {} (title row {}, header row {}, data from row {})",
            spec.name().bright_blue().bold(),
            rows.title_row,
            rows.header_row,
            rows.data_start_row
        );
        let templates = spec.block_templates();
        let placements = plan_blocks(&templates, rows.block_gap);
        for ((template, placement), binding) in
            templates.iter().zip(&placements).zip(spec.bindings())
        {
            println!(
                "      {} {}{}:{}{} → {}",
                template.title.bold(),
                column_letter(placement.start_column),
                rows.title_row,
                column_letter(placement.end_column()),
                rows.title_row,
                binding.repository_name().cyan()
            );
            for (column, label) in (placement.start_column..).zip(&template.labels) {
                println!(
                    "         {:<3} {} ({})",
                    column_letter(column),
                    label,
                    column_width(label)
                );
            }
        }
        println!();
    }

    println!("{}", "✅ Layout is valid".bold().green());
    Ok(())
}
