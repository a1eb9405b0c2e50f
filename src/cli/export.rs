//! CLI command for data export
//!
//! Writes the full ledger or one day of it to a file.

use std::path::PathBuf;

use clap::Args;

use crate::error::TrackerResult;
use crate::export::{export_transactions, ExportFormat};
use crate::services::{filter_by_date, sort_descending_by_date};
use crate::session::Session;
use crate::storage::write_atomic;

use super::transaction::parse_date;

/// Export arguments
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path
    pub output: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Only export this day (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,
}

/// Handle the export command
pub fn handle_export_command(session: &mut Session, args: ExportArgs) -> TrackerResult<()> {
    let ledger = session.ledger()?;

    let transactions = match &args.date {
        Some(date) => filter_by_date(ledger.all(), parse_date(date)?),
        None => sort_descending_by_date(ledger.all()),
    };

    write_atomic(&args.output, |writer| {
        export_transactions(&transactions, args.format, writer)
    })?;

    println!(
        "Exported {} transactions to: {}",
        transactions.len(),
        args.output.display()
    );
    Ok(())
}
