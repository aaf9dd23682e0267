//! Extraction strategy selection and text escalation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::StatementConfig;
use crate::models::transaction::{ExtractionResult, Provenance, RawTable, TransactionRecord};
use crate::pdf::DocumentSource;

use super::enhance::{enhance_with_timeout, IdentityEnhancer, TextEnhancer};
use super::mapping::{ColumnMapping, TableMapper};
use super::normalizer::normalize;
use super::parser::{PatternParser, TransactionParser};
use super::Result;

/// Top-level extraction strategy, chosen by the user per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Detect tables and map their columns.
    Table,
    /// Pattern-parse the extracted text.
    Text,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "table-based" => Ok(Self::Table),
            "text" | "text-based" => Ok(Self::Text),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// Stages of the text strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextStage {
    Initial,
    Enhanced,
    Accepted(Provenance),
    Rejected,
}

/// Runs the selected strategy and, for text, escalates to an enhancer when
/// the parser finds fewer than `min_records_before_escalation` records.
pub struct StrategySelector {
    parser: Box<dyn TransactionParser>,
    enhancer: Arc<dyn TextEnhancer>,
    mapper: TableMapper,
    min_records_before_escalation: usize,
    enhancement_prefix_length: usize,
    enhancement_timeout: Option<Duration>,
}

impl StrategySelector {
    /// Create a selector with default thresholds around `enhancer`.
    pub fn new(enhancer: Arc<dyn TextEnhancer>) -> Self {
        Self::from_config(&StatementConfig::default(), enhancer)
    }

    /// Create a selector from configuration.
    pub fn from_config(config: &StatementConfig, enhancer: Arc<dyn TextEnhancer>) -> Self {
        Self {
            parser: Box::new(PatternParser::new()),
            enhancer,
            mapper: TableMapper::new().with_mapping(config.tables.column_mapping.clone()),
            min_records_before_escalation: config.extraction.min_records_before_escalation,
            enhancement_prefix_length: config.extraction.enhancement_prefix_length,
            enhancement_timeout: config.enhancement_timeout(),
        }
    }

    /// Replace the transaction parser.
    pub fn with_parser(mut self, parser: impl TransactionParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Set the escalation threshold.
    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records_before_escalation = min_records;
        self
    }

    /// Set how many leading characters go to the enhancer.
    pub fn with_prefix_length(mut self, length: usize) -> Self {
        self.enhancement_prefix_length = length;
        self
    }

    /// Set the enhancement deadline (`None` waits indefinitely).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.enhancement_timeout = timeout;
        self
    }

    /// Use a fixed column mapping for tables.
    pub fn with_column_mapping(mut self, mapping: Option<ColumnMapping>) -> Self {
        self.mapper = TableMapper::new().with_mapping(mapping);
        self
    }

    /// Run `strategy` against a document source.
    pub fn extract(&self, strategy: Strategy, source: &dyn DocumentSource) -> crate::Result<ExtractionResult> {
        info!("Extracting with {} strategy", strategy);

        let result = match strategy {
            Strategy::Table => {
                let tables = source.tables()?;
                self.extract_tables(&tables)?
            }
            Strategy::Text => {
                let text = source.text()?;
                self.extract_text(&text)?
            }
        };

        Ok(result)
    }

    /// Table strategy over already-detected tables.
    pub fn extract_tables(&self, tables: &[RawTable]) -> Result<ExtractionResult> {
        let start = start_timer();

        let rows = normalize(tables)?;
        let mapped = self.mapper.map(&rows);

        let mut result = ExtractionResult::new(mapped.records, Provenance::Table);
        if result.is_empty() {
            result.warnings.push(
                "no date/amount columns recognized; rows are passed through unmapped".to_string(),
            );
        } else if mapped.skipped > 0 {
            debug!("Skipped {} non-transaction table rows", mapped.skipped);
        }

        info!("Table strategy: {} rows, {} records", rows.len(), result.len());
        result.raw_rows = rows;
        result.processing_time_ms = elapsed_ms(start);
        Ok(result)
    }

    /// Text strategy over already-extracted text.
    pub fn extract_text(&self, text: &str) -> Result<ExtractionResult> {
        let start = start_timer();

        if text.trim().is_empty() {
            return Err(ExtractionError::NoTextExtracted);
        }

        let mut warnings = Vec::new();
        let mut stage = TextStage::Initial;
        let initial = self.parser.parse(text)?;
        let mut records = Vec::new();

        loop {
            stage = match stage {
                TextStage::Initial => {
                    debug!("Initial parse found {} records", initial.len());
                    if initial.len() < self.min_records_before_escalation {
                        TextStage::Enhanced
                    } else {
                        records = initial.clone();
                        TextStage::Accepted(Provenance::Text)
                    }
                }
                TextStage::Enhanced => {
                    let (chosen, provenance) = self.escalate(text, &initial, &mut warnings)?;
                    records = chosen;
                    if records.is_empty() {
                        TextStage::Rejected
                    } else {
                        TextStage::Accepted(provenance)
                    }
                }
                TextStage::Accepted(provenance) => {
                    info!("Text strategy accepted {} records ({})", records.len(), provenance);
                    let mut result = ExtractionResult::new(records, provenance);
                    result.raw_text = text.to_string();
                    result.warnings = warnings;
                    result.processing_time_ms = elapsed_ms(start);
                    return Ok(result);
                }
                TextStage::Rejected => {
                    info!("Text strategy rejected: no transactions recognized");
                    return Err(ExtractionError::NoTransactionsParsed);
                }
            };
        }
    }

    /// Enhance a prefix of `text` and pick between initial and enhanced records.
    fn escalate(
        &self,
        text: &str,
        initial: &[TransactionRecord],
        warnings: &mut Vec<String>,
    ) -> Result<(Vec<TransactionRecord>, Provenance)> {
        let prefix: String = text.chars().take(self.enhancement_prefix_length).collect();

        info!(
            "Only {} records (< {}), escalating {} characters to enhancer {}",
            initial.len(),
            self.min_records_before_escalation,
            prefix.chars().count(),
            self.enhancer.name()
        );

        let enhanced_text = match enhance_with_timeout(&self.enhancer, &prefix, self.enhancement_timeout) {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!("Enhancement unavailable, keeping initial records: {}", e);
                warnings.push(format!("{}; kept {} unenhanced records", ExtractionError::from(e), initial.len()));
                return Ok((initial.to_vec(), Provenance::Text));
            }
        };

        let enhanced = self.parser.parse(&enhanced_text)?;
        debug!("Enhanced parse found {} records", enhanced.len());

        if enhanced.len() > initial.len() {
            Ok((enhanced, Provenance::TextEnhanced))
        } else {
            Ok((initial.to_vec(), Provenance::Text))
        }
    }
}

// `Instant::now` panics on wasm32-unknown-unknown.
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

fn elapsed_ms(start: Option<Instant>) -> u64 {
    start.map(|s| s.elapsed().as_millis() as u64).unwrap_or(0)
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(Arc::new(IdentityEnhancer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnhancementError;
    use crate::statement::amounts::parse_amount;
    use crate::statement::enhance::FnEnhancer;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TWO_LINES: &str = "2025-08-15 ATM Withdrawal -500.00\n2025-08-16 Salary 2000";
    const THREE_LINES: &str = "2025-08-15 ATM Withdrawal -500.00\n2025-08-16 Salary 2000\n2025-08-17 Fee -1.50";

    fn counting(calls: Arc<AtomicUsize>, output: &'static str) -> Arc<dyn TextEnhancer> {
        Arc::new(FnEnhancer::new("counting", move |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(output.to_string())
        }))
    }

    #[test]
    fn test_two_records_escalate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = StrategySelector::new(counting(calls.clone(), ""));

        let result = selector.extract_text(TWO_LINES).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.provenance, Provenance::Text);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_three_records_do_not_escalate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = StrategySelector::new(counting(calls.clone(), ""));

        let result = selector.extract_text(THREE_LINES).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.provenance, Provenance::Text);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_enhanced_records_win_when_more_numerous() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = StrategySelector::new(counting(calls.clone(), THREE_LINES));

        let result = selector.extract_text("garbled 2O25-O8-15 ATM -5OO").unwrap();
        assert_eq!(result.provenance, Provenance::TextEnhanced);
        assert_eq!(result.len(), 3);
        assert_eq!(result.raw_text, "garbled 2O25-O8-15 ATM -5OO");
    }

    #[test]
    fn test_enhancer_receives_bounded_prefix() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in = seen.clone();
        let enhancer: Arc<dyn TextEnhancer> = Arc::new(FnEnhancer::new("len", move |t: &str| {
            seen_in.store(t.chars().count(), Ordering::SeqCst);
            Ok(t.to_string())
        }));

        let text = format!("{}\n2025-08-15 Coffee -3.00", "é".repeat(1500));
        let selector = StrategySelector::new(enhancer);
        let result = selector.extract_text(&text).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1000);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_empty_text_is_no_text() {
        let selector = StrategySelector::default();
        assert!(matches!(selector.extract_text(""), Err(ExtractionError::NoTextExtracted)));
        assert!(matches!(selector.extract_text(" \n\n "), Err(ExtractionError::NoTextExtracted)));
    }

    #[test]
    fn test_no_matches_after_escalation_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = StrategySelector::new(counting(calls.clone(), "still nothing here"));

        let err = selector.extract_text("Statement of account\nNo activity").unwrap_err();
        assert!(matches!(err, ExtractionError::NoTransactionsParsed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_enhancement_failure_falls_back() {
        let failing: Arc<dyn TextEnhancer> =
            Arc::new(FnEnhancer::new("failing", |_: &str| Err(EnhancementError::Failed("model offline".into()))));
        let selector = StrategySelector::new(failing);

        let result = selector.extract_text(TWO_LINES).unwrap();
        assert_eq!(result.provenance, Provenance::Text);
        assert_eq!(result.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("model offline"));
    }

    #[test]
    fn test_enhancement_failure_with_nothing_rejected() {
        let failing: Arc<dyn TextEnhancer> =
            Arc::new(FnEnhancer::new("failing", |_: &str| Err(EnhancementError::Unavailable)));
        let selector = StrategySelector::new(failing);

        assert!(matches!(
            selector.extract_text("nothing to see"),
            Err(ExtractionError::NoTransactionsParsed)
        ));
    }

    #[test]
    fn test_enhancement_timeout_falls_back() {
        let slow: Arc<dyn TextEnhancer> = Arc::new(FnEnhancer::new("slow", |t: &str| {
            std::thread::sleep(Duration::from_millis(500));
            Ok(t.to_string())
        }));
        let selector = StrategySelector::new(slow).with_timeout(Some(Duration::from_millis(20)));

        let result = selector.extract_text(TWO_LINES).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.warnings[0].contains("timed out"));
    }

    #[test]
    fn test_custom_threshold() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = StrategySelector::new(counting(calls.clone(), "")).with_min_records(5);

        selector.extract_text(THREE_LINES).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_table_strategy_no_tables() {
        let selector = StrategySelector::default();
        assert!(matches!(selector.extract_tables(&[]), Err(ExtractionError::NoTablesDetected)));
    }

    #[test]
    fn test_table_strategy_maps_rows() {
        let table = RawTable::new(
            1,
            vec![
                vec!["Date".into(), "Description".into(), "Amount".into()],
                vec!["2025-08-15".into(), "ATM Withdrawal".into(), "-500.00".into()],
            ],
        );

        let result = StrategySelector::default().extract_tables(&[table]).unwrap();
        assert_eq!(result.provenance, Provenance::Table);
        assert_eq!(result.len(), 1);
        assert_eq!(result.raw_rows.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_table_strategy_unmapped_rows_pass_through() {
        let table = RawTable::new(1, vec![vec!["a".into(), "b".into()], vec!["c".into(), "d".into()]]);

        let result = StrategySelector::default().extract_tables(&[table]).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.raw_rows.len(), 2);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Table-based".parse::<Strategy>().unwrap(), Strategy::Table);
        assert_eq!("text".parse::<Strategy>().unwrap(), Strategy::Text);
        assert!("ocr".parse::<Strategy>().is_err());
    }

    /// Semicolon-separated `date;description;amount` lines.
    struct DelimitedParser;

    impl TransactionParser for DelimitedParser {
        fn parse(&self, text: &str) -> Result<Vec<TransactionRecord>> {
            text.lines()
                .filter_map(|line| {
                    let mut fields = line.split(';');
                    Some((fields.next()?, fields.next()?, fields.next()?))
                })
                .map(|(date, description, amount)| {
                    parse_amount(amount).map(|value| TransactionRecord::new(date, description, value))
                })
                .collect()
        }
    }

    #[test]
    fn test_custom_parser_replaces_patterns() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = StrategySelector::new(counting(calls.clone(), "")).with_parser(DelimitedParser);

        let result = selector
            .extract_text("15.08.2025;Coffee;-3.50\n16.08.2025;Salary;2000\n17.08.2025;Fee;-1.00")
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.provenance, Provenance::Text);
        assert_eq!(
            result.records[0],
            TransactionRecord::new("15.08.2025", "Coffee", parse_amount("-3.50").unwrap())
        );

        // Pattern text is opaque to the delimited parser.
        assert!(matches!(
            selector.extract_text(TWO_LINES),
            Err(ExtractionError::NoTransactionsParsed)
        ));
    }

    #[test]
    fn test_column_mapping_override_for_headerless_tables() {
        let table = RawTable::new(
            1,
            vec![
                vec!["2025-08-15".into(), "-500.00".into(), "ATM Withdrawal".into()],
                vec!["2025-08-16".into(), "2,000.00".into(), "Salary".into()],
            ],
        );
        let mapping = ColumnMapping {
            date: Some(0),
            description: Some(2),
            amount: Some(1),
            ..ColumnMapping::default()
        };

        let unmapped = StrategySelector::default().extract_tables(std::slice::from_ref(&table)).unwrap();
        assert!(unmapped.is_empty());

        let result = StrategySelector::default()
            .with_column_mapping(Some(mapping))
            .extract_tables(&[table])
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.warnings.is_empty());
        assert_eq!(result.records[1].description(), "Salary");
        assert_eq!(result.total_credit(), Some(parse_amount("2000").unwrap()));
    }
}
