//! Convert command - extract transactions from a single statement PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use bankstmt_core::export::XlsxExporter;
use bankstmt_core::models::config::StatementConfig;
use bankstmt_core::statement::amounts::format_amount;
use bankstmt_core::{ExtractionResult, PdfSource, Provenance, StreamTableDetector};

use super::{build_selector, load_config, records_csv, rows_csv, spinner, EnhancerArg, StrategyArg};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Extraction strategy
    #[arg(short, long, value_enum)]
    strategy: StrategyArg,

    /// Output file (default: configured file name for xlsx, stdout otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Override the configured enhancer
    #[arg(long, value_enum)]
    enhancer: Option<EnhancerArg>,

    /// Print the extracted text or table rows
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Excel workbook
    Xlsx,
    /// CSV output
    Csv,
    /// JSON output
    Json,
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Converting file: {}", args.input.display());

    let pb = spinner("Loading PDF...")?;
    let result = match extract(&args, &config, &pb) {
        Ok(result) => result,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e);
        }
    };
    pb.finish_and_clear();

    if args.show_text {
        print_source(&result)?;
    }

    write_output(&args, &config, &result)?;
    print_summary(&result);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn extract(
    args: &ConvertArgs,
    config: &StatementConfig,
    pb: &indicatif::ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    let data = fs::read(&args.input)?;
    let source = PdfSource::from_bytes(&data)?.with_detector(StreamTableDetector::from_config(&config.tables));
    debug!("PDF has {} pages", source.page_count());

    pb.set_message(format!("Extracting with {:?} strategy...", args.strategy));

    let selector = build_selector(config, args.enhancer);
    Ok(selector.extract(args.strategy.into(), &source)?)
}

fn write_output(args: &ConvertArgs, config: &StatementConfig, result: &ExtractionResult) -> anyhow::Result<()> {
    let passthrough = result.is_empty() && !result.raw_rows.is_empty();

    let content = match args.format {
        OutputFormat::Xlsx => {
            let exporter = XlsxExporter::from_config(&config.export);
            let bytes = if passthrough {
                exporter.export_rows(&result.raw_rows)?
            } else {
                exporter.export(&result.records)?
            };

            let output_path = args.output.clone().unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            fs::write(&output_path, bytes)?;
            println!("{} Output written to {}", style("✓").green(), output_path.display());
            return Ok(());
        }
        OutputFormat::Csv if passthrough => rows_csv(&result.raw_rows)?,
        OutputFormat::Csv => records_csv(&result.records)?,
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &content)?;
        println!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn print_source(result: &ExtractionResult) -> anyhow::Result<()> {
    match result.provenance {
        Provenance::Table => print!("{}", rows_csv(&result.raw_rows)?),
        Provenance::Text | Provenance::TextEnhanced => println!("{}", result.raw_text),
    }
    println!();
    Ok(())
}

fn print_summary(result: &ExtractionResult) {
    eprintln!(
        "{} {} transactions ({}) in {}ms",
        style("ℹ").blue(),
        result.len(),
        result.provenance,
        result.processing_time_ms
    );
    let credits = result.total_credit().map(format_amount);
    let debits = result.total_debit().map(format_amount);
    eprintln!(
        "   credits {}, debits {}",
        style(credits.unwrap_or_else(|| "overflow".to_string())).green(),
        style(debits.unwrap_or_else(|| "overflow".to_string())).red()
    );

    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
}
