//! Transaction repository for CSV storage
//!
//! Manages loading and saving the ledger to `transactions.csv`. The whole
//! collection is read on load and rewritten on every save; there is no
//! incremental persistence.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::models::{
    parse_timestamp, Category, Money, Transaction, TransactionId, TransactionStatus,
};

use super::file_io::write_atomic;

/// Column names of the ledger file, in order
pub const HEADERS: [&str; 5] = ["Date", "Description", "Category", "Amount", "Status"];

/// One row as read from disk. Fields are kept as text so a bad date can be
/// coerced instead of failing the whole file.
#[derive(Debug, Deserialize)]
struct StoredRow {
    #[serde(rename = "Date", default)]
    date: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: String,
    /// Absent in files written before statuses existed
    #[serde(rename = "Status", default)]
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    date: String,
    description: &'a str,
    category: &'static str,
    amount: String,
    status: &'static str,
}

impl<'a> From<&'a Transaction> for OutputRow<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            date: txn.date_string(),
            description: &txn.description,
            category: txn.category.as_str(),
            amount: txn.amount.to_string(),
            status: txn.status.as_str(),
        }
    }
}

/// Read ledger rows from CSV, numbering them from `first_id`.
///
/// Unparseable dates become `None`; a missing or empty status becomes
/// Pending. An unknown category or status, or a bad amount, is an error that
/// names the offending line.
pub fn read_transactions<R: Read>(reader: R, first_id: u64) -> Result<Vec<Transaction>, TrackerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut transactions = Vec::new();

    for (index, result) in csv_reader.deserialize::<StoredRow>().enumerate() {
        let row = result?;
        // Header is line 1
        let line = index + 2;
        let bad_row = |what: String| TrackerError::Storage(format!("line {}: {}", line, what));

        let category: Category = row.category.parse().map_err(bad_row)?;
        let amount = Money::parse(&row.amount).map_err(|e| bad_row(e.to_string()))?;
        let status: TransactionStatus = match row.status.as_deref().map(str::trim) {
            None | Some("") => TransactionStatus::Pending,
            Some(raw) => raw.parse().map_err(bad_row)?,
        };

        transactions.push(Transaction {
            id: TransactionId::new(first_id + index as u64),
            date: parse_timestamp(&row.date),
            description: row.description,
            category,
            amount,
            status,
        });
    }

    Ok(transactions)
}

/// Write ledger rows as CSV. The header is always written, even for an
/// empty collection.
pub fn write_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<(), TrackerError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADERS)?;
    for txn in transactions {
        csv_writer.serialize(OutputRow::from(txn))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Repository for the ledger file.
///
/// Holds the working set in memory, in its current order. Ids are assigned
/// in load order starting at 1 and are never reused while the repository
/// lives.
#[derive(Debug)]
pub struct TransactionRepository {
    path: PathBuf,
    transactions: Vec<Transaction>,
    next_id: u64,
}

impl TransactionRepository {
    /// Create an empty, unloaded repository for `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            transactions: Vec::new(),
            next_id: 1,
        }
    }

    /// Load transactions from disk, replacing the working set.
    ///
    /// A missing file is an empty ledger, not an error.
    pub fn load(&mut self) -> Result<(), TrackerError> {
        self.transactions = if self.path.exists() {
            let file = File::open(&self.path).map_err(|e| {
                TrackerError::Storage(format!("Failed to open {}: {}", self.path.display(), e))
            })?;
            read_transactions(BufReader::new(file), 1).map_err(|e| {
                let detail = match e {
                    TrackerError::Storage(message) => message,
                    other => other.to_string(),
                };
                TrackerError::Storage(format!(
                    "Failed to parse {}: {}",
                    self.path.display(),
                    detail
                ))
            })?
        } else {
            Vec::new()
        };
        self.next_id = self.transactions.len() as u64 + 1;

        tracing::debug!(
            path = %self.path.display(),
            count = self.transactions.len(),
            "loaded ledger"
        );
        Ok(())
    }

    /// Write the full working set to disk
    pub fn save(&self) -> Result<(), TrackerError> {
        write_atomic(&self.path, |writer| write_transactions(writer, &self.transactions))?;

        tracing::debug!(
            path = %self.path.display(),
            count = self.transactions.len(),
            "saved ledger"
        );
        Ok(())
    }

    /// Path of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All transactions in their current order
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Get a transaction by id
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Position of a transaction in the current order
    pub fn position(&self, id: TransactionId) -> Option<usize> {
        self.transactions.iter().position(|t| t.id == id)
    }

    /// Count transactions
    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    /// Append a transaction, assigning it a fresh id. Does not save.
    pub fn push(&mut self, mut txn: Transaction) -> &Transaction {
        txn.id = TransactionId::new(self.next_id);
        self.next_id += 1;
        self.transactions.push(txn);
        &self.transactions[self.transactions.len() - 1]
    }

    /// Remove the transaction at `position`. Does not save.
    pub fn remove_at(&mut self, position: usize) -> Option<Transaction> {
        if position < self.transactions.len() {
            Some(self.transactions.remove(position))
        } else {
            None
        }
    }

    /// Put a previously removed transaction back at `position`, keeping its
    /// id. Positions past the end append.
    pub fn insert_at(&mut self, position: usize, txn: Transaction) {
        let position = position.min(self.transactions.len());
        self.transactions.insert(position, txn);
    }

    /// Reorder the working set in place with a stable sort
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Transaction, &Transaction) -> std::cmp::Ordering,
    {
        self.transactions.sort_by(compare);
    }
}
