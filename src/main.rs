use clap::{Parser, Subcommand};
use sheetmap::cli;
use sheetmap::error::MappingResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetmap")]
#[command(about = "Generate spreadsheet templates and load them back as typed records")]
#[command(long_about = "sheetmap - Declarative spreadsheet ↔ record mapping

A layout file declares sheets and the record tables placed on each sheet as
horizontal blocks: a merged title, a header row, then data rows until the
first fully blank row.

COMMANDS:
  template  - Write a blank template for a layout
  load      - Load a filled-in workbook and report what was read
  check     - Validate a layout and show where every block lands

EXAMPLES:
  sheetmap template cars.yaml cars.xlsx
  sheetmap load cars.yaml filled.xlsx -o rows.json
  sheetmap check cars.yaml

Set RUST_LOG=sheetmap=debug for block-by-block tracing.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a blank template workbook for a layout
    Template {
        /// Layout file (YAML)
        layout: PathBuf,

        /// Output workbook (.xlsx), overwritten if present
        output: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Load a filled-in workbook.

Every sheet named in the layout must exist. Blocks whose header row cannot be
found are skipped, unless every column declares an index. The first parse or
validation error aborts the load.

Use -o to write the loaded rows as JSON (.json) or YAML (.yaml, .yml).")]
    /// Load a workbook using a layout
    Load {
        /// Layout file (YAML)
        layout: PathBuf,

        /// Workbook to read (xlsx, xls, xlsb, ods)
        data: PathBuf,

        /// Write loaded rows to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a layout file without touching any workbook
    Check {
        /// Layout file (YAML)
        layout: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "sheetmap=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> MappingResult<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Template { verbose, .. } | Commands::Load { verbose, .. } => *verbose,
        Commands::Check { .. } => false,
    };
    init_tracing(verbose);

    match cli.command {
        Commands::Template {
            layout,
            output,
            verbose,
        } => cli::template(layout, output, verbose),

        Commands::Load {
            layout,
            data,
            output,
            verbose,
        } => cli::load(layout, data, output, verbose),

        Commands::Check { layout } => cli::check(layout),
    }
}
