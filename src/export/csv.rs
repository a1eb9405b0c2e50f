//! CSV Export functionality
//!
//! Writes a view of the ledger in the same column layout as the ledger file,
//! so an export can be loaded back as a ledger.

use std::io::Write;

use crate::error::{TrackerError, TrackerResult};
use crate::models::Transaction;
use crate::storage::write_transactions;

/// Export transactions to CSV
pub fn export_transactions_csv<W: Write>(
    transactions: &[Transaction],
    writer: &mut W,
) -> TrackerResult<()> {
    write_transactions(writer, transactions).map_err(|e| TrackerError::Export(e.to_string()))
}
