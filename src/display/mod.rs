//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger views and reports for terminal
//! display.

pub mod report;
pub mod transaction;

pub use transaction::{
    format_grouped_transactions, format_transaction_details, format_transaction_table,
};
