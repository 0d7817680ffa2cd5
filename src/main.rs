use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use service_scripts::io::excel_read::{ExcelWorkbook, TabularSource};
use service_scripts::io::text_write::{self, TextWriter};
use service_scripts::matcher::{ColumnResolver, ColumnRoles, ExactName, Pattern, RecordMatcher};
use service_scripts::model::{ServiceRequest, merge_requests};
use service_scripts::pipeline::{self, ScanResult};
use service_scripts::{Result, ToolError, logging};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Command::Sheets(args) => execute_sheets(&args),
        Command::Scan(args) => execute_scan(&args).map(|_| ()),
        Command::Generate(args) => execute_generate(&args),
    }
}

fn execute_sheets(args: &SheetsArgs) -> Result<()> {
    let workbook = open_workbook(&args.workbook)?;
    for (index, name) in workbook.sheet_names().iter().enumerate() {
        println!("{}. {name}", index + 1);
    }
    Ok(())
}

fn execute_scan(args: &ScanArgs) -> Result<(Vec<ServiceRequest>, ScanResult)> {
    let workbook = open_workbook(&args.workbook)?;
    let available = workbook.sheet_names();
    if available.is_empty() {
        return Err(ToolError::InvalidSelection(format!(
            "no sheets found in {}",
            args.workbook.display()
        )));
    }
    let sheets = pipeline::select_sheets(&available, &args.sheets)?;
    tracing::info!(?sheets, "selected sheets");

    let requests = merge_requests(
        args.services
            .iter()
            .map(|arg| ServiceRequest::parse(arg))
            .collect::<Result<Vec<_>>>()?,
    );

    let matcher = RecordMatcher::with_roles(&workbook, args.columns.roles()?);
    let scan = pipeline::scan(&matcher, &sheets, &requests);
    print!("{}", pipeline::summary_table(&scan.summaries));

    if let Some(report) = &args.report {
        text_write::write_report(report, &scan.summaries)?;
        println!("Scan report written to {}", report.display());
    }

    Ok((requests, scan))
}

fn execute_generate(args: &GenerateArgs) -> Result<()> {
    let (requests, scan) = execute_scan(&args.scan)?;

    if !args.yes && !confirm("Proceed to generate scripts for these records? (y/n): ")? {
        println!("Operation cancelled by user. No scripts generated.");
        tracing::info!("operation cancelled after preview");
        return Ok(());
    }

    let writer = TextWriter::new(&args.output_dir)?;
    let report = pipeline::generate(&scan, &requests, &writer)?;
    for path in report.scripts.iter().chain(&report.summaries) {
        println!("Wrote {}", path.display());
    }

    if report.lines_written == 0 {
        println!("No matching records were processed.");
    } else {
        println!(
            "Done! Processed {} total records across selected sheets.",
            report.lines_written
        );
        tracing::info!(total = report.lines_written, "completed");
    }
    Ok(())
}

fn open_workbook(path: &Path) -> Result<ExcelWorkbook> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    ExcelWorkbook::open(path)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate routing scripts for the service ids recorded in a workbook."
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Append log output to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the sheets of a workbook.
    Sheets(SheetsArgs),
    /// Count matching codes per sheet and service without writing scripts.
    Scan(ScanArgs),
    /// Scan, confirm, then write per-sheet scripts and per-service summaries.
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct SheetsArgs {
    /// Workbook to read.
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    workbook: PathBuf,
}

const DEFAULT_WORKBOOK: &str = "data/MO_Connection Database.xlsx";

#[derive(clap::Args)]
struct ScanArgs {
    /// Workbook to read.
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    workbook: PathBuf,

    /// Sheets to search: `all`, 1-based indices, or names, comma-separated.
    #[arg(long, default_value = "all")]
    sheets: String,

    /// Service and destination username, e.g. `1056=cellfsc`. Repeatable.
    #[arg(long = "service", value_name = "ID=DEST", required = true)]
    services: Vec<String>,

    /// Also write the per-pair counts as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(flatten)]
    columns: ColumnArgs,
}

#[derive(clap::Args)]
struct ColumnArgs {
    /// Exact header of the service id column.
    #[arg(long, conflicts_with = "id_pattern")]
    id_column: Option<String>,

    /// Regex matched against normalized headers to find the service id column.
    #[arg(long)]
    id_pattern: Option<String>,

    /// Exact header of the sub-identifier column.
    #[arg(long, conflicts_with = "code_pattern")]
    code_column: Option<String>,

    /// Regex matched against normalized headers to find the sub-identifier column.
    #[arg(long)]
    code_pattern: Option<String>,
}

impl ColumnArgs {
    fn roles(&self) -> Result<ColumnRoles> {
        let defaults = ColumnRoles::default();
        Ok(ColumnRoles {
            identifier: resolver(self.id_column.as_deref(), self.id_pattern.as_deref())?
                .unwrap_or(defaults.identifier),
            code: resolver(self.code_column.as_deref(), self.code_pattern.as_deref())?
                .unwrap_or(defaults.code),
        })
    }
}

fn resolver(exact: Option<&str>, pattern: Option<&str>) -> Result<Option<Box<dyn ColumnResolver>>> {
    let resolver: Option<Box<dyn ColumnResolver>> = match (exact, pattern) {
        (Some(name), _) => Some(Box::new(ExactName::new(name))),
        (None, Some(pattern)) => Some(Box::new(Pattern::new(pattern)?)),
        (None, None) => None,
    };
    Ok(resolver)
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[command(flatten)]
    scan: ScanArgs,

    /// Directory receiving scripts and summaries.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}
