//! Batch conversion command for multiple statement PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use bankstmt_core::export::XlsxExporter;
use bankstmt_core::models::config::StatementConfig;
use bankstmt_core::{ExtractionResult, PdfSource, StatementError, StrategySelector, StreamTableDetector};

use super::{build_selector, load_config, EnhancerArg, StrategyArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching statement PDFs
    #[arg(required = true)]
    input: String,

    /// Extraction strategy
    #[arg(short, long, value_enum)]
    strategy: StrategyArg,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Override the configured enhancer
    #[arg(long, value_enum)]
    enhancer: Option<EnhancerArg>,
}

/// Result of converting a single file.
struct ConvertResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
    finished_at: DateTime<Local>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to convert", style("ℹ").blue(), files.len());

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let selector = build_selector(&config, args.enhancer);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = convert_single_file(&path, &selector, &args, &config, &output_dir);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => results.push(ConvertResult {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
                finished_at: Local::now(),
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error && is_recoverable(&e) {
                    warn!("Failed to convert {}: {}", path.display(), error_msg);
                    results.push(ConvertResult {
                        path,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                        finished_at: Local::now(),
                    });
                } else {
                    error!("Failed to convert {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Conversion failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Extraction failures and unreadable PDFs are skippable; I/O and export are not.
fn is_recoverable(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<StatementError>() {
        Some(StatementError::Extraction(e)) => e.is_recoverable(),
        Some(StatementError::Pdf(_)) => true,
        Some(_) => false,
        None => error.downcast_ref::<bankstmt_core::PdfError>().is_some(),
    }
}

fn convert_single_file(
    path: &Path,
    selector: &StrategySelector,
    args: &BatchArgs,
    config: &StatementConfig,
    output_dir: &Path,
) -> anyhow::Result<ExtractionResult> {
    let data = fs::read(path)?;
    let source = PdfSource::from_bytes(&data)?.with_detector(StreamTableDetector::from_config(&config.tables));
    let result = selector.extract(args.strategy.into(), &source)?;

    let exporter = XlsxExporter::from_config(&config.export);
    let bytes = if result.is_empty() && !result.raw_rows.is_empty() {
        exporter.export_rows(&result.raw_rows)?
    } else {
        exporter.export(&result.records)?
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("statement");
    let output_path = output_dir.join(format!("{}.xlsx", stem));
    fs::write(&output_path, bytes)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(result)
}

fn total_cell(total: Option<impl ToString>) -> String {
    total.map(|t| t.to_string()).unwrap_or_else(|| "overflow".to_string())
}

fn write_summary(path: &Path, results: &[ConvertResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "provenance",
        "records",
        "total_credit",
        "total_debit",
        "processing_time_ms",
        "finished_at",
        "error",
    ])?;

    for entry in results {
        let filename = entry.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let finished_at = entry.finished_at.to_rfc3339();

        if let Some(result) = &entry.result {
            wtr.write_record([
                filename,
                "success",
                result.provenance.as_str(),
                &result.len().to_string(),
                &total_cell(result.total_credit()),
                &total_cell(result.total_debit()),
                &entry.processing_time_ms.to_string(),
                &finished_at,
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &entry.processing_time_ms.to_string(),
                &finished_at,
                entry.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cell() {
        assert_eq!(total_cell(Some(12.5)), "12.5");
        assert_eq!(total_cell(None::<u64>), "overflow");
    }
}
