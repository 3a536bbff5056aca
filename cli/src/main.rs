//! rowreport CLI - spreadsheet rows to PDF reports

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use rowreport::render::{to_json, to_markdown};
use rowreport::{
    detect_format_from_path, read_file, ArchiveOptions, ColumnSignature, EntryNaming, JsonFormat,
    PageGeometry, PolicyRegistry, RenderOptions, ReportPipeline, SourceRow, StyleTable,
};

#[derive(Parser)]
#[command(name = "rowreport")]
#[command(version)]
#[command(about = "Render spreadsheet rows into PDF reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every row and write a ZIP archive of PDFs
    Batch {
        /// Input spreadsheet (xlsx, xlsm, xls, ods, csv)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output archive (default: <FILE stem>_reports.zip)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render rows in parallel
        #[arg(long, env = "ROWREPORT_PARALLEL")]
        parallel: bool,

        /// JSON style table
        #[arg(long, value_name = "FILE", env = "ROWREPORT_STYLE")]
        style: Option<PathBuf>,

        /// Use A4 pages instead of US Letter
        #[arg(long)]
        a4: bool,

        /// Append this column's value to entry names
        #[arg(long, value_name = "COLUMN")]
        name_column: Option<String>,

        /// Skip rows already marked true in a status column
        #[arg(
            long,
            value_name = "COLUMN",
            num_args = 0..=1,
            default_missing_value = "processed"
        )]
        unprocessed_only: Option<String>,
    },

    /// Render a single row to PDF
    Row {
        /// Input spreadsheet
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// 1-based data row
        #[arg(short, long)]
        row: usize,

        /// Output file (default: row_<N>.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// JSON style table
        #[arg(long, value_name = "FILE", env = "ROWREPORT_STYLE")]
        style: Option<PathBuf>,

        /// Use A4 pages instead of US Letter
        #[arg(long)]
        a4: bool,
    },

    /// Print a row's document as Markdown
    Preview {
        /// Input spreadsheet
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// 1-based data row
        #[arg(short, long)]
        row: usize,

        /// Print the document tree as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Show spreadsheet information
    Info {
        /// Input spreadsheet
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            parallel,
            style,
            a4,
            name_column,
            unprocessed_only,
        }) => cmd_batch(
            &input,
            output.as_deref(),
            parallel,
            style.as_deref(),
            a4,
            name_column,
            unprocessed_only,
        ),
        Some(Commands::Row {
            input,
            row,
            output,
            style,
            a4,
        }) => cmd_row(&input, row, output.as_deref(), style.as_deref(), a4),
        Some(Commands::Preview { input, row, json }) => cmd_preview(&input, row, json),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: rowreport <COMMAND> <FILE>".yellow());
            println!("       rowreport --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn render_options(
    style: Option<&Path>,
    a4: bool,
) -> Result<RenderOptions, Box<dyn std::error::Error>> {
    let mut options = RenderOptions::new();
    if a4 {
        options = options.with_geometry(PageGeometry::a4());
    }
    if let Some(path) = style {
        let json = fs::read_to_string(path)?;
        options = options.with_styles(StyleTable::from_json(&json)?);
    }
    options.validate()?;
    Ok(options)
}

fn find_row(rows: &[SourceRow], row: usize) -> Result<&SourceRow, Box<dyn std::error::Error>> {
    rows.iter()
        .find(|r| r.row == row)
        .ok_or_else(|| format!("Row {} not found ({} data rows)", row, rows.len()).into())
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    parallel: bool,
    style: Option<&Path>,
    a4: bool,
    name_column: Option<String>,
    unprocessed_only: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_reports.zip", stem))
    });

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    pb.set_message("Reading spreadsheet...");
    let rows = read_file(input)?;
    log::debug!("read {} rows from {}", rows.len(), input.display());

    let naming = match name_column {
        Some(column) => EntryNaming::RowAndColumn(column),
        None => EntryNaming::RowNumber,
    };
    let mut pipeline = ReportPipeline::new()
        .with_render_options(render_options(style, a4)?)
        .with_archive_options(ArchiveOptions::new().with_naming(naming))
        .with_parallel(parallel);
    if let Some(column) = unprocessed_only {
        pipeline = pipeline.with_skip_processed(column);
    }

    pb.set_message(format!("Rendering {} rows...", rows.len()));
    let archive = pipeline.build_archive(&rows);
    pb.finish_and_clear();
    let archive = match archive {
        Err(rowreport::Error::NoRows) => {
            println!("{}", "No unprocessed rows found.".yellow());
            return Ok(());
        }
        other => other?,
    };

    fs::write(&output, &archive.bytes)?;

    println!(
        "{} {} reports written to {}",
        "Done!".green().bold(),
        archive.entries.len(),
        output.display()
    );
    if archive.is_partial() {
        println!(
            "{} {} rows skipped:",
            "Warning:".yellow().bold(),
            archive.failures.len()
        );
        for failure in &archive.failures {
            println!("  {} {}", "└─".dimmed(), failure);
        }
    }

    Ok(())
}

fn cmd_row(
    input: &Path,
    row: usize,
    output: Option<&Path>,
    style: Option<&Path>,
    a4: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = read_file(input)?;
    let source = find_row(&rows, row)?;

    let pipeline = ReportPipeline::new().with_render_options(render_options(style, a4)?);
    let doc = pipeline.render_row(source)?;

    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("row_{}.pdf", row)));
    fs::write(&output, &doc.bytes)?;
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_preview(input: &Path, row: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rows = read_file(input)?;
    let source = find_row(&rows, row)?;
    let tree = ReportPipeline::new().compose_row(source)?;

    if json {
        println!("{}", to_json(&tree, JsonFormat::Pretty)?);
    } else {
        println!("{}", to_markdown(&tree));
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let rows = read_file(input)?;

    println!("{}", "Spreadsheet Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Rows".bold(), rows.len());

    if let Some(first) = rows.first() {
        let columns: Vec<&str> = first.record.columns().collect();
        println!("{}: {}", "Columns".bold(), columns.len());

        let signature = ColumnSignature::of_record(&first.record);
        let registry = PolicyRegistry::with_defaults();
        println!(
            "{}: {}",
            "Layout".bold(),
            registry.resolve_signature(&signature).name()
        );

        println!();
        println!("{}", "Columns".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (i, column) in columns.iter().enumerate() {
            let branch = if i + 1 == columns.len() { "└─" } else { "├─" };
            println!("  {} {}", branch.dimmed(), column);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "rowreport".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Spreadsheet row to PDF report generator");
    println!();
    println!("License: MIT");
}
