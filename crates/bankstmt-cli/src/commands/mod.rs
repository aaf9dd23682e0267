//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod convert;
pub mod parse;

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use bankstmt_core::models::config::{EnhancerKind, StatementConfig};
use bankstmt_core::statement::create_enhancer;
use bankstmt_core::{RawTableRow, Strategy, StrategySelector, TransactionRecord};

/// Extraction strategy selected on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum StrategyArg {
    /// Detect column-aligned tables
    Table,
    /// Pattern-match transaction lines in the text
    Text,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Table => Strategy::Table,
            StrategyArg::Text => Strategy::Text,
        }
    }
}

/// Enhancer override for the text strategy.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EnhancerArg {
    /// Leave text unchanged
    Identity,
    /// Whitespace and OCR digit cleanup
    Cleanup,
}

impl From<EnhancerArg> for EnhancerKind {
    fn from(arg: EnhancerArg) -> Self {
        match arg {
            EnhancerArg::Identity => EnhancerKind::Identity,
            EnhancerArg::Cleanup => EnhancerKind::Cleanup,
        }
    }
}

/// Load configuration from `-c`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StatementConfig> {
    if let Some(path) = config_path {
        return Ok(StatementConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(StatementConfig::from_file(&default_path)?)
    } else {
        Ok(StatementConfig::default())
    }
}

/// Build a selector from configuration, honoring an enhancer override.
pub fn build_selector(config: &StatementConfig, enhancer: Option<EnhancerArg>) -> StrategySelector {
    let kind = enhancer.map(EnhancerKind::from).unwrap_or(config.extraction.enhancer);
    debug!("Using {:?} enhancer", kind);
    StrategySelector::from_config(config, create_enhancer(kind))
}

pub fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

pub fn records_csv(records: &[TransactionRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "description", "amount", "credit", "debit"])?;
    for record in records {
        wtr.write_record([
            record.date(),
            record.description(),
            &record.amount().to_string(),
            &record.credit().to_string(),
            &record.debit().to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub fn rows_csv(rows: &[RawTableRow]) -> anyhow::Result<String> {
    let mut padded = rows.to_vec();
    bankstmt_core::statement::normalizer::pad_rows(&mut padded);

    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in &padded {
        wtr.write_record(row)?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}
