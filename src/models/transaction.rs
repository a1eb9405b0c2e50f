//! Transaction model
//!
//! A dated expense with a description, category, positive amount and status.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::Category;
use super::ids::TransactionId;
use super::money::Money;

/// Format used when writing timestamps to the ledger file.
/// Fractional seconds are only written when present.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransactionStatus {
    /// Not yet settled
    #[default]
    Pending,
    /// Settled
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "Unknown status '{}'. Expected Pending or Completed",
                other
            )),
        }
    }
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Row handle for this session; not written to the ledger file
    #[serde(skip)]
    pub id: TransactionId,

    /// When the transaction happened. `None` if the stored value could not be parsed.
    pub date: Option<NaiveDateTime>,

    /// Free-text description
    pub description: String,

    /// Spending category
    pub category: Category,

    /// Amount spent
    pub amount: Money,

    /// Settlement status
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        id: TransactionId,
        date: NaiveDateTime,
        description: impl Into<String>,
        category: Category,
        amount: Money,
        status: TransactionStatus,
    ) -> Self {
        Self {
            id,
            date: Some(date),
            description: description.into(),
            category,
            amount,
            status,
        }
    }

    /// The calendar date, ignoring the time of day
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.date())
    }

    /// True if the fields that are persisted match; the session id is ignored
    pub fn same_record(&self, other: &Transaction) -> bool {
        self.date == other.date
            && self.description == other.description
            && self.category == other.category
            && self.amount == other.amount
            && self.status == other.status
    }

    /// The timestamp as written to the ledger file (empty when invalid)
    pub fn date_string(&self) -> String {
        self.date
            .map(|d| d.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = match self.date {
            Some(_) => self.date_string(),
            None => "(invalid date)".to_string(),
        };
        write!(
            f,
            "{} {} - {} ({})",
            date, self.description, self.amount, self.status
        )
    }
}

/// Parse a stored timestamp
///
/// Accepts `YYYY-MM-DD HH:MM:SS` with optional fractional seconds, the same
/// with a `T` separator, `YYYY-MM-DD HH:MM`, and bare dates (midnight).
/// Anything else yields `None` rather than an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
