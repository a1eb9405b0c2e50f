//! Transaction service
//!
//! Business logic for the ledger: adding and deleting with write-through
//! persistence, plus the queries used by the views (date filter, timestamp
//! grouping, date ordering, category totals).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, Money, Transaction, TransactionId, TransactionStatus};
use crate::storage::TransactionRepository;

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
    pub category: Category,
    pub amount: Money,
    pub status: TransactionStatus,
}

/// Service for ledger mutations
pub struct TransactionService<'a> {
    ledger: &'a mut TransactionRepository,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service over a loaded ledger
    pub fn new(ledger: &'a mut TransactionRepository) -> Self {
        Self { ledger }
    }

    /// Append a transaction and rewrite the ledger file.
    ///
    /// Rejects non-positive amounts, and amounts above
    /// [Money::MAX_AMOUNT], before touching anything.
    pub fn create(&mut self, input: CreateTransactionInput) -> TrackerResult<Transaction> {
        if !input.amount.is_positive() {
            tracing::warn!(amount = %input.amount, "rejected transaction with non-positive amount");
            return Err(TrackerError::Validation(
                "Amount must be greater than zero".into(),
            ));
        }
        if input.amount > Money::MAX_AMOUNT {
            tracing::warn!(amount = %input.amount, "rejected transaction above the amount limit");
            return Err(TrackerError::Validation(format!(
                "Amount must not exceed {}",
                Money::MAX_AMOUNT
            )));
        }

        let txn = Transaction::new(
            TransactionId::default(),
            NaiveDateTime::new(input.date, input.time),
            input.description,
            input.category,
            input.amount,
            input.status,
        );

        let created = self.ledger.push(txn).clone();

        if let Err(e) = self.ledger.save() {
            // Keep memory in step with the file
            self.ledger.remove_at(self.ledger.count() - 1);
            return Err(e);
        }

        tracing::info!(id = %created.id, amount = %created.amount, "added transaction");
        Ok(created)
    }

    /// Sort the ledger newest first and return it.
    ///
    /// The sorted order becomes the ledger's working order, so positions
    /// given to [Self::delete_at_position] afterwards refer to this view.
    pub fn view_all(&mut self) -> &[Transaction] {
        self.ledger.sort_by(compare_date_desc);
        self.ledger.all()
    }

    /// Sort the ledger newest first, then group the rows dated `date` by
    /// exact timestamp.
    pub fn search_by_date(&mut self, date: NaiveDate) -> Vec<TimestampGroup> {
        group_by_timestamp(&filter_by_date(self.view_all(), date))
    }

    /// The ledger in its current working order
    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.all()
    }

    /// Position of a transaction in the current working order
    pub fn position(&self, id: TransactionId) -> Option<usize> {
        self.ledger.position(id)
    }

    /// Find a transaction by id string (`7` or `#7`)
    pub fn find(&self, identifier: &str) -> Option<&Transaction> {
        identifier
            .parse::<TransactionId>()
            .ok()
            .and_then(|id| self.ledger.get(id))
    }

    /// Remove the transaction at `position` in the current working order and
    /// rewrite the ledger file.
    ///
    /// # Errors
    ///
    /// Returns [TrackerError::NotFound] without mutating anything when the
    /// position is out of range.
    pub fn delete_at_position(&mut self, position: usize) -> TrackerResult<Transaction> {
        let removed = self
            .ledger
            .remove_at(position)
            .ok_or_else(|| TrackerError::transaction_not_found(format!("position {}", position)))?;

        if let Err(e) = self.ledger.save() {
            self.ledger.insert_at(position, removed);
            return Err(e);
        }

        tracing::info!(id = %removed.id, position, "deleted transaction");
        Ok(removed)
    }

    /// Remove a transaction by id and rewrite the ledger file
    pub fn delete(&mut self, id: TransactionId) -> TrackerResult<Transaction> {
        let position = self
            .ledger
            .position(id)
            .ok_or_else(|| TrackerError::transaction_not_found(id.to_string()))?;

        self.delete_at_position(position)
    }
}

/// Order by date, newest first. Invalid dates sort after all valid ones.
pub fn compare_date_desc(a: &Transaction, b: &Transaction) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable newest-first copy of a collection
pub fn sort_descending_by_date(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(compare_date_desc);
    sorted
}

/// Transactions whose calendar date is `target`, in their original order.
/// Transactions with an invalid date never match.
pub fn filter_by_date(transactions: &[Transaction], target: NaiveDate) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.day() == Some(target))
        .cloned()
        .collect()
}

/// A transaction with its presentation-only serial number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedTransaction {
    /// 1-based position within its group
    pub serial: usize,
    pub transaction: Transaction,
}

/// Transactions sharing one exact timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampGroup {
    pub timestamp: NaiveDateTime,
    pub rows: Vec<NumberedTransaction>,
}

/// Group transactions by exact timestamp, earliest group first, numbering
/// rows 1..N within each group in their original order.
pub fn group_by_timestamp(transactions: &[Transaction]) -> Vec<TimestampGroup> {
    let mut groups: BTreeMap<NaiveDateTime, Vec<Transaction>> = BTreeMap::new();

    for txn in transactions {
        if let Some(timestamp) = txn.date {
            groups.entry(timestamp).or_default().push(txn.clone());
        }
    }

    groups
        .into_iter()
        .map(|(timestamp, rows)| TimestampGroup {
            timestamp,
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, transaction)| NumberedTransaction {
                    serial: i + 1,
                    transaction,
                })
                .collect(),
        })
        .collect()
}

/// Sum of amounts per category. Categories with no transactions are absent.
pub fn aggregate_by_category(transactions: &[Transaction]) -> BTreeMap<Category, Money> {
    let mut totals = BTreeMap::new();
    for txn in transactions {
        *totals.entry(txn.category).or_insert_with(Money::zero) += txn.amount;
    }
    totals
}

/// Sum of every amount, whatever its status
pub fn total_spending(transactions: &[Transaction]) -> Money {
    transactions.iter().map(|t| t.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn txn(id: u64, date: Option<NaiveDateTime>, category: Category, cents: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            date,
            description: format!("txn {}", id),
            category,
            amount: Money::from_cents(cents),
            status: TransactionStatus::Pending,
        }
    }

    fn input(day: u32, hour: u32, cents: i64) -> CreateTransactionInput {
        CreateTransactionInput {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            description: format!("day {}", day),
            category: Category::Food,
            amount: Money::from_cents(cents),
            status: TransactionStatus::Pending,
        }
    }

    fn create_test_ledger() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = TransactionRepository::new(temp_dir.path().join("transactions.csv"));
        ledger.load().unwrap();
        (temp_dir, ledger)
    }

    fn rows_on_disk(temp_dir: &TempDir) -> usize {
        let mut reloaded = TransactionRepository::new(temp_dir.path().join("transactions.csv"));
        reloaded.load().unwrap();
        reloaded.count()
    }

    #[test]
    fn test_create_combines_date_and_time_and_persists() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);

        let created = service.create(input(5, 14, 1999)).unwrap();

        assert_eq!(created.date, Some(ts(5, 14)));
        assert_eq!(created.amount.cents(), 1999);
        assert_eq!(rows_on_disk(&temp_dir), 1);
    }

    #[test]
    fn test_create_appends_without_sorting() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);

        service.create(input(1, 9, 100)).unwrap();
        service.create(input(3, 9, 100)).unwrap();
        service.create(input(2, 9, 100)).unwrap();

        let dates: Vec<_> = ledger.all().iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![Some(ts(1, 9)), Some(ts(3, 9)), Some(ts(2, 9))]);
    }

    #[test]
    fn test_create_rejects_non_positive_amounts() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        service.create(input(1, 9, 100)).unwrap();

        for cents in [0, -500] {
            let err = service.create(input(2, 9, cents)).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), "Validation error: Amount must be greater than zero");
        }

        assert_eq!(ledger.count(), 1);
        assert_eq!(rows_on_disk(&temp_dir), 1);
    }

    #[test]
    fn test_create_rejects_amounts_above_limit() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);

        let limit = Money::MAX_AMOUNT.cents();
        service.create(input(1, 9, limit)).unwrap();

        let huge = Money::parse("90000000000000000").unwrap().cents();
        for cents in [limit + 1, huge] {
            let err = service.create(input(2, 9, cents)).unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains("Amount must not exceed"));
        }

        assert_eq!(ledger.count(), 1);
        assert_eq!(rows_on_disk(&temp_dir), 1);
    }

    #[test]
    fn test_totals_of_huge_stored_amounts_do_not_overflow() {
        let huge = Money::parse("90000000000000000").unwrap().cents();
        let transactions = vec![
            txn(1, Some(ts(1, 9)), Category::Food, huge),
            txn(2, Some(ts(2, 9)), Category::Food, huge),
        ];

        assert_eq!(total_spending(&transactions).cents(), i64::MAX);
        assert_eq!(
            aggregate_by_category(&transactions)[&Category::Food].cents(),
            i64::MAX
        );
    }

    #[test]
    fn test_delete_position_zero_after_sort_removes_most_recent() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        service.create(input(1, 9, 100)).unwrap();
        service.create(input(3, 9, 300)).unwrap();
        service.create(input(2, 9, 200)).unwrap();

        let before = service.view_all().to_vec();
        let removed = service.delete_at_position(0).unwrap();

        assert_eq!(removed.date, Some(ts(3, 9)));
        assert_eq!(ledger.all(), &before[1..]);
        assert_eq!(rows_on_disk(&temp_dir), 2);
    }

    #[test]
    fn test_failed_save_rolls_back_create() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        service.create(input(1, 9, 100)).unwrap();
        let before = service.transactions().to_vec();

        // A directory where the ledger file should be makes every save fail
        let path = temp_dir.path().join("transactions.csv");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(service.create(input(2, 9, 200)).is_err());
        assert_eq!(ledger.count(), 1);
        assert_eq!(ledger.all(), &before[..]);
    }

    #[test]
    fn test_failed_save_rolls_back_delete() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        service.create(input(1, 9, 100)).unwrap();
        service.create(input(3, 9, 300)).unwrap();
        service.create(input(2, 9, 200)).unwrap();
        let before = service.view_all().to_vec();

        let path = temp_dir.path().join("transactions.csv");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(service.delete_at_position(1).is_err());
        assert_eq!(ledger.count(), 3);
        assert_eq!(ledger.all(), &before[..]);
    }

    #[test]
    fn test_delete_out_of_range_is_an_error() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        service.create(input(1, 9, 100)).unwrap();

        let err = service.delete_at_position(1).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(ledger.count(), 1);
        assert_eq!(rows_on_disk(&temp_dir), 1);
    }

    #[test]
    fn test_search_by_date_leaves_ledger_sorted() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        service.create(input(1, 9, 100)).unwrap();
        service.create(input(2, 9, 200)).unwrap();
        service.create(input(1, 18, 300)).unwrap();

        let groups = service.search_by_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let timestamps: Vec<_> = groups.iter().map(|g| g.timestamp).collect();
        assert_eq!(timestamps, vec![ts(1, 9), ts(1, 18)]);
        let dates: Vec<_> = ledger.all().iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![Some(ts(2, 9)), Some(ts(1, 18)), Some(ts(1, 9))]);
    }

    #[test]
    fn test_delete_by_id() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let mut service = TransactionService::new(&mut ledger);
        let first = service.create(input(1, 9, 100)).unwrap();
        let second = service.create(input(2, 9, 200)).unwrap();

        service.view_all();
        let removed = service.delete(first.id).unwrap();
        assert_eq!(removed.id, first.id);
        assert!(service.find(&second.id.to_string()).is_some());
        assert!(service.find(&first.id.to_string()).is_none());

        assert!(service.delete(first.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_filter_by_date_keeps_order() {
        let target = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let transactions = vec![
            txn(1, Some(ts(1, 10)), Category::Food, 100),
            txn(2, Some(ts(2, 10)), Category::Food, 200),
            txn(3, Some(ts(1, 8)), Category::Food, 300),
        ];

        let filtered = filter_by_date(&transactions, target);

        let ids: Vec<_> = filtered.iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_filter_by_date_skips_invalid_dates() {
        let target = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let transactions = vec![
            txn(1, None, Category::Food, 100),
            txn(2, Some(ts(1, 10)), Category::Food, 200),
        ];

        let filtered = filter_by_date(&transactions, target);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id.get(), 2);
    }

    #[test]
    fn test_group_by_timestamp_numbers_rows() {
        let transactions = vec![
            txn(1, Some(ts(1, 12)), Category::Food, 100),
            txn(2, Some(ts(1, 9)), Category::Food, 200),
            txn(3, Some(ts(1, 12)), Category::Transport, 300),
        ];

        let groups = group_by_timestamp(&transactions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].timestamp, ts(1, 9));
        assert_eq!(groups[0].rows.len(), 1);
        assert_eq!(groups[0].rows[0].serial, 1);

        assert_eq!(groups[1].timestamp, ts(1, 12));
        let serials: Vec<_> = groups[1].rows.iter().map(|r| (r.serial, r.transaction.id.get())).collect();
        assert_eq!(serials, vec![(1, 1), (2, 3)]);
    }

    #[test]
    fn test_sort_descending_is_stable_and_puts_invalid_last() {
        let transactions = vec![
            txn(1, Some(ts(1, 9)), Category::Food, 100),
            txn(2, None, Category::Food, 100),
            txn(3, Some(ts(3, 9)), Category::Food, 100),
            txn(4, Some(ts(1, 9)), Category::Food, 100),
        ];

        let sorted = sort_descending_by_date(&transactions);

        let ids: Vec<_> = sorted.iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
        for pair in sorted.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].date, pair[1].date) {
                assert!(a >= b);
            }
        }
    }

    #[test]
    fn test_aggregate_by_category() {
        let transactions = vec![
            txn(1, Some(ts(1, 9)), Category::Food, 1000),
            txn(2, Some(ts(1, 9)), Category::Food, 500),
            txn(3, Some(ts(1, 9)), Category::Transport, 2000),
        ];

        let totals = aggregate_by_category(&transactions);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&Category::Food], Money::from_cents(1500));
        assert_eq!(totals[&Category::Transport], Money::from_cents(2000));
        assert!(!totals.contains_key(&Category::Entertainment));
    }

    #[test]
    fn test_total_spending_counts_every_status() {
        let mut completed = txn(2, Some(ts(1, 9)), Category::Food, 250);
        completed.status = TransactionStatus::Completed;
        let transactions = vec![txn(1, Some(ts(1, 9)), Category::Food, 100), completed];

        assert_eq!(total_spending(&transactions), Money::from_cents(350));
        assert_eq!(total_spending(&[]), Money::zero());
    }
}
