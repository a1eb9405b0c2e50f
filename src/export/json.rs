//! JSON Export functionality
//!
//! Exports a ledger view to JSON with schema versioning and summary metadata.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Money, Transaction};
use crate::services::total_spending;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported ledger view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub transactions: Vec<Transaction>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,

    /// Sum of all amounts
    pub total_spending: Money,

    /// Date range of transactions (earliest)
    pub earliest_transaction: Option<String>,

    /// Date range of transactions (latest)
    pub latest_transaction: Option<String>,
}

impl LedgerExport {
    /// Build an export of `transactions`
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let dates = || transactions.iter().filter_map(|t| t.date);

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            total_spending: total_spending(transactions),
            earliest_transaction: dates().min().map(|d| d.to_string()),
            latest_transaction: dates().max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            transactions: transactions.to_vec(),
            metadata,
        }
    }
}

/// Export transactions to JSON
pub fn export_transactions_json<W: Write>(
    transactions: &[Transaction],
    writer: &mut W,
    pretty: bool,
) -> TrackerResult<()> {
    let export = LedgerExport::from_transactions(transactions);

    let result = if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    };
    result.map_err(|e| TrackerError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| TrackerError::Export(e.to_string()))?;
    Ok(())
}
