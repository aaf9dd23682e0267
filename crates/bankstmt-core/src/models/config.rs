//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StatementError};
use crate::statement::mapping::ColumnMapping;

/// Main configuration for the bankstmt pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// Text strategy and escalation configuration.
    pub extraction: ExtractionConfig,

    /// Table detection and mapping configuration.
    pub tables: TableConfig,

    /// Spreadsheet output configuration.
    pub export: ExportConfig,
}

/// Which enhancement collaborator the text strategy escalates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancerKind {
    /// Pass text through unchanged.
    Identity,
    /// OCR-style whitespace and digit cleanup.
    #[default]
    Cleanup,
}

/// Text strategy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Escalate to enhancement when fewer records than this are parsed.
    pub min_records_before_escalation: usize,

    /// Number of leading characters handed to the enhancer.
    pub enhancement_prefix_length: usize,

    /// Wall-clock ceiling for one enhancement call (0 = no limit).
    pub enhancement_timeout_secs: u64,

    /// Enhancer used by the CLI.
    pub enhancer: EnhancerKind,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_records_before_escalation: 3,
            enhancement_prefix_length: 1000,
            enhancement_timeout_secs: 30,
            enhancer: EnhancerKind::default(),
        }
    }
}

/// Table detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Minimum cells per line for it to count as a table row.
    pub min_columns: usize,

    /// Minimum consecutive rows that make up a table.
    pub min_rows: usize,

    /// Minimum run of spaces separating two cells.
    pub column_gap: usize,

    /// Explicit column mapping; overrides header detection when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_mapping: Option<ColumnMapping>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_columns: 3,
            min_rows: 2,
            column_gap: 2,
            column_mapping: None,
        }
    }
}

/// Spreadsheet output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Worksheet name.
    pub sheet_name: String,

    /// Default output file name.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: crate::export::DEFAULT_SHEET_NAME.to_string(),
            file_name: crate::export::DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl StatementConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| StatementError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| StatementError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Enhancement timeout, `None` when disabled.
    pub fn enhancement_timeout(&self) -> Option<std::time::Duration> {
        match self.extraction.enhancement_timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}
