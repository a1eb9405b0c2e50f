//! Transaction display formatting
//!
//! Tables for the full ledger list and the date search view.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::display::report::truncate;
use crate::models::Transaction;
use crate::services::{NumberedTransaction, TimestampGroup};

const DESCRIPTION_WIDTH: usize = 32;

#[derive(Tabled)]
struct LedgerRow {
    #[tabled(rename = "Pos")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

#[derive(Tabled)]
struct SerialRow {
    #[tabled(rename = "S.No")]
    serial: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn display_date(txn: &Transaction) -> String {
    match txn.date {
        Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        None => "(invalid date)".to_string(),
    }
}

/// Format the ledger as a table, one row per transaction in the given order.
///
/// `Pos` is the 0-based position used for deletion.
pub fn format_transaction_table(transactions: &[Transaction], currency_symbol: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().enumerate().map(|(position, txn)| LedgerRow {
        position,
        id: txn.id.to_string(),
        date: display_date(txn),
        description: truncate(&txn.description, DESCRIPTION_WIDTH),
        category: txn.category.as_str(),
        amount: txn.amount.format_with_symbol(currency_symbol),
        status: txn.status.as_str(),
    });

    let mut output = Table::new(rows).with(Style::modern()).to_string();
    output.push('\n');
    output
}

fn serial_row(row: &NumberedTransaction, currency_symbol: &str) -> SerialRow {
    let txn = &row.transaction;
    SerialRow {
        serial: row.serial,
        id: txn.id.to_string(),
        description: truncate(&txn.description, DESCRIPTION_WIDTH),
        category: txn.category.as_str(),
        amount: txn.amount.format_with_symbol(currency_symbol),
        status: txn.status.as_str(),
    }
}

/// Format timestamp groups, each under its own heading with serial numbers
/// restarting at 1
pub fn format_grouped_transactions(groups: &[TimestampGroup], currency_symbol: &str) -> String {
    if groups.is_empty() {
        return "No transactions found for that date.\n".to_string();
    }

    let mut output = String::new();
    for group in groups {
        output.push_str(&format!("{}\n", group.timestamp.format("%Y-%m-%d %H:%M:%S")));

        let rows = group.rows.iter().map(|row| serial_row(row, currency_symbol));
        output.push_str(&Table::new(rows).with(Style::modern()).to_string());
        output.push_str("\n\n");
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, currency_symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", display_date(txn)));
    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Category:    {}\n", txn.category));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!("Status:      {}\n", txn.status));

    output
}
