//! Parse command - run the text strategy on plain text.

use std::fs;
use std::io::Read;

use clap::Args;
use tracing::info;

use bankstmt_core::parse_transactions;

use super::{build_selector, load_config, records_csv, EnhancerArg};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file to parse ("-" for stdin)
    #[arg(required = true)]
    input: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: TextFormat,

    /// Skip enhancement and report raw parser matches
    #[arg(long)]
    raw: bool,

    /// Override the configured enhancer
    #[arg(long, value_enum)]
    enhancer: Option<EnhancerArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TextFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let text = if args.input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input)?
    };

    info!("Parsing {} characters of text", text.len());

    let output = if args.raw {
        let records = parse_transactions(&text)?;
        match args.format {
            TextFormat::Json => serde_json::to_string_pretty(&records)?,
            TextFormat::Csv => records_csv(&records)?,
        }
    } else {
        let config = load_config(config_path)?;
        let result = build_selector(&config, args.enhancer).extract_text(&text)?;
        match args.format {
            TextFormat::Json => serde_json::to_string_pretty(&result)?,
            TextFormat::Csv => records_csv(&result.records)?,
        }
    };

    print!("{}", output);
    if args.format == TextFormat::Json {
        println!();
    }

    Ok(())
}
