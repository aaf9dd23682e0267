//! Statement extraction: text parsing, table mapping, and strategy selection.

pub mod amounts;
pub mod enhance;
pub mod mapping;
pub mod normalizer;
mod parser;
pub mod patterns;
mod selector;

pub use enhance::{create_enhancer, CleanupEnhancer, FnEnhancer, IdentityEnhancer, TextEnhancer};
pub use mapping::{ColumnMapping, MappedRows, TableMapper};
pub use normalizer::normalize;
pub use parser::{parse_transactions, PatternParser, TransactionParser};
pub use selector::{Strategy, StrategySelector};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
