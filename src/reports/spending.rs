//! Spending Report
//!
//! Category breakdown of a ledger view, with share of total and a text bar
//! chart.

use std::io::Write;

use crate::display::report::{format_bar, format_percentage, separator};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, Money, Transaction};
use crate::services::aggregate_by_category;

const BAR_WIDTH: usize = 30;

/// Spending in one category
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingByCategory {
    pub category: Category,
    pub total_spending: Money,
    pub transaction_count: usize,
    /// Share of total spending, 0-100
    pub percentage: f64,
}

/// Spending Report
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingReport {
    /// Categories with spending, most spending first
    pub categories: Vec<SpendingByCategory>,
    pub total_spending: Money,
    pub total_transactions: usize,
}

impl SpendingReport {
    /// Build the breakdown for a set of transactions
    pub fn generate(transactions: &[Transaction]) -> Self {
        let totals = aggregate_by_category(transactions);
        let total_spending: Money = totals.values().sum();

        let mut categories: Vec<SpendingByCategory> = totals
            .into_iter()
            .map(|(category, spending)| {
                let percentage = if total_spending.is_zero() {
                    0.0
                } else {
                    spending.as_f64() / total_spending.as_f64() * 100.0
                };

                SpendingByCategory {
                    category,
                    total_spending: spending,
                    transaction_count: transactions
                        .iter()
                        .filter(|t| t.category == category)
                        .count(),
                    percentage,
                }
            })
            .collect();

        // Ties keep category order
        categories.sort_by(|a, b| b.total_spending.cmp(&a.total_spending));

        Self {
            categories,
            total_spending,
            total_transactions: transactions.len(),
        }
    }

    /// Check if there is anything to report
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        if self.is_empty() {
            return "No transactions to summarize.\n".to_string();
        }

        let max = self
            .categories
            .first()
            .map(|c| c.total_spending.as_f64())
            .unwrap_or(0.0);

        let mut output = String::new();
        output.push_str("Spending by Category\n");
        output.push_str(&separator(72));
        output.push('\n');

        for category in &self.categories {
            output.push_str(&format!(
                "{:<14} {:>12} {:>6} {} {:>4}\n",
                category.category.as_str(),
                category.total_spending.format_with_symbol(currency_symbol),
                format_percentage(category.percentage),
                format_bar(category.total_spending.as_f64(), max, BAR_WIDTH),
                category.transaction_count
            ));
        }

        output.push_str(&separator(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<14} {:>12}        {} transaction(s)\n",
            "Total",
            self.total_spending.format_with_symbol(currency_symbol),
            self.total_transactions
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> TrackerResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["Category", "Amount", "Transaction Count", "Percentage"])?;
        for category in &self.categories {
            csv_writer.write_record([
                category.category.as_str().to_string(),
                category.total_spending.to_string(),
                category.transaction_count.to_string(),
                format!("{:.2}", category.percentage),
            ])?;
        }
        csv_writer.write_record([
            "Total".to_string(),
            self.total_spending.to_string(),
            self.total_transactions.to_string(),
            "100.00".to_string(),
        ])?;

        csv_writer
            .flush()
            .map_err(|e| TrackerError::Export(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionId, TransactionStatus};
    use chrono::NaiveDate;

    fn txn(category: Category, cents: i64) -> Transaction {
        Transaction::new(
            TransactionId::default(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            "test",
            category,
            Money::from_cents(cents),
            TransactionStatus::Pending,
        )
    }

    #[test]
    fn test_generate_spending_report() {
        let transactions = vec![
            txn(Category::Food, 1000),
            txn(Category::Food, 500),
            txn(Category::Transport, 2000),
            txn(Category::Utilities, 500),
        ];

        let report = SpendingReport::generate(&transactions);

        assert_eq!(report.total_spending, Money::from_cents(4000));
        assert_eq!(report.total_transactions, 4);
        assert_eq!(report.categories.len(), 3);

        let top = &report.categories[0];
        assert_eq!(top.category, Category::Transport);
        assert_eq!(top.percentage, 50.0);

        let food = report
            .categories
            .iter()
            .find(|c| c.category == Category::Food)
            .unwrap();
        assert_eq!(food.total_spending, Money::from_cents(1500));
        assert_eq!(food.transaction_count, 2);
    }

    #[test]
    fn test_empty_report() {
        let report = SpendingReport::generate(&[]);
        assert!(report.is_empty());
        assert_eq!(report.total_spending, Money::zero());
        assert!(report.format_terminal("₹").contains("No transactions"));
    }

    #[test]
    fn test_format_terminal_lists_categories() {
        let report = SpendingReport::generate(&[txn(Category::Food, 1250)]);
        let output = report.format_terminal("₹");

        assert!(output.contains("Food"));
        assert!(output.contains("₹12.50"));
        assert!(output.contains("100%"));
    }

    #[test]
    fn test_export_csv() {
        let report = SpendingReport::generate(&[txn(Category::Food, 1000), txn(Category::Other, 1000)]);
        let mut buffer = Vec::new();
        report.export_csv(&mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "Category,Amount,Transaction Count,Percentage");
        assert_eq!(lines[1], "Food,10.00,1,50.00");
        assert_eq!(lines[3], "Total,20.00,2,100.00");
    }
}
