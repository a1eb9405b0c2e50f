//! YAML Export functionality
//!
//! Human-readable export of a ledger view.

use std::io::Write;

use crate::error::{TrackerError, TrackerResult};
use crate::export::json::LedgerExport;
use crate::models::Transaction;

/// Export transactions to YAML
pub fn export_transactions_yaml<W: Write>(
    transactions: &[Transaction],
    writer: &mut W,
) -> TrackerResult<()> {
    let export = LedgerExport::from_transactions(transactions);
    let to_export_error = |e: std::io::Error| TrackerError::Export(e.to_string());

    writeln!(writer, "# Expense Tracker Export").map_err(to_export_error)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(to_export_error)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(to_export_error)?;
    writeln!(writer).map_err(to_export_error)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Money, TransactionId, TransactionStatus};
    use chrono::NaiveDate;

    #[test]
    fn test_export_yaml() {
        let txn = Transaction::new(
            TransactionId::new(1),
            NaiveDate::from_ymd_opt(2024, 7, 4)
                .unwrap()
                .and_hms_opt(18, 30, 0)
                .unwrap(),
            "Fireworks",
            Category::Entertainment,
            Money::from_cents(2000),
            TransactionStatus::Completed,
        );

        let mut buffer = Vec::new();
        export_transactions_yaml(&[txn.clone()], &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.starts_with("# Expense Tracker Export"));
        assert!(output.contains("description: Fireworks"));

        let parsed: LedgerExport = serde_yaml::from_str(&output).unwrap();
        assert!(parsed.transactions[0].same_record(&txn));
    }
}
