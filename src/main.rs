use anyhow::Context;
use clap::Parser;
use royalbit_sheetlens::cli;
use royalbit_sheetlens::diagnostics::init_logging;
use royalbit_sheetlens::error::LensError;
use royalbit_sheetlens::writer::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetlens")]
#[command(about = "Analyze Excel workbooks (.xlsx, .xlsm, .xls) into structured reports.")]
#[command(long_about = "SheetLens - Workbook structure and formatting analyzer

Reads a modern (.xlsx/.xlsm) or legacy (.xls) workbook and writes one
report per requested format. At least one format flag is required.

OUTPUTS:
  --json    <stem>_analysis.json   Full canonical model
  --yaml    <stem>_analysis.yaml   Same document as YAML
  --html    <stem>_analysis.html   Interactive report with worksheet tabs
  --text    <stem>_analysis.txt    Plain-text summary
  --csv     <stem>_<sheet>.csv     One grid per worksheet
  --excel   <stem>_analysis.xlsx   Summary workbook

EXAMPLES:
  sheetlens budget.xlsx --json --html
  sheetlens legacy.xls --text -o reports/
  SHEETLENS_LOG=debug sheetlens book.xlsx --csv")]
#[command(version)]
struct Cli {
    /// Workbook to analyze
    input: PathBuf,

    /// Write the JSON report
    #[arg(long)]
    json: bool,

    /// Write the YAML report
    #[arg(long)]
    yaml: bool,

    /// Write the HTML report
    #[arg(long)]
    html: bool,

    /// Write the plain-text report
    #[arg(long)]
    text: bool,

    /// Write one CSV file per worksheet
    #[arg(long)]
    csv: bool,

    /// Write the Excel summary workbook
    #[arg(long)]
    excel: bool,

    /// Directory for generated reports (created if missing)
    #[arg(short, long, default_value = ".", env = "SHEETLENS_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Show progress and info-level diagnostics
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn formats(&self) -> Vec<OutputFormat> {
        [
            (self.json, OutputFormat::Json),
            (self.yaml, OutputFormat::Yaml),
            (self.html, OutputFormat::Html),
            (self.text, OutputFormat::Text),
            (self.csv, OutputFormat::Csv),
            (self.excel, OutputFormat::Excel),
        ]
        .into_iter()
        .filter_map(|(requested, format)| requested.then_some(format))
        .collect()
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let formats = cli.formats();
    let input = cli.input.clone();
    cli::analyze(cli.input, &formats, cli.output_dir, cli.verbose)
        .with_context(|| format!("analysis of {} failed", input.display()))?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        let message = match err.downcast_ref::<LensError>() {
            Some(lens) => lens.user_message(),
            None => format!("{:#}", err),
        };
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}
