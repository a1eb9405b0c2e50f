//! Export module for the expense tracker
//!
//! Exports any ledger view (full list or a single day) in several formats:
//! - CSV: same columns as the ledger file, loadable as a ledger
//! - JSON: machine-readable, with metadata
//! - YAML: human-readable, with metadata

pub mod csv;
pub mod json;
pub mod yaml;

use std::io::Write;

use clap::ValueEnum;

use crate::error::TrackerResult;
use crate::models::Transaction;

pub use csv::export_transactions_csv;
pub use json::{export_transactions_json, LedgerExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_transactions_yaml;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// Ledger-compatible CSV
    #[default]
    Csv,
    /// JSON with metadata
    Json,
    /// YAML with metadata
    Yaml,
}

impl ExportFormat {
    /// Parse a format name typed at a prompt. Empty means CSV.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Write `transactions` to `writer` in `format`
pub fn export_transactions<W: Write>(
    transactions: &[Transaction],
    format: ExportFormat,
    writer: &mut W,
) -> TrackerResult<()> {
    match format {
        ExportFormat::Csv => export_transactions_csv(transactions, writer),
        ExportFormat::Json => export_transactions_json(transactions, writer, true),
        ExportFormat::Yaml => export_transactions_yaml(transactions, writer),
    }
}
