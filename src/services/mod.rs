//! Service layer for the expense tracker
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation and the queries behind each view.

pub mod auth;
pub mod budget;
pub mod transaction;

pub use auth::AuthService;
pub use budget::{budget_check, estimate_tax, validate_tax_input, BudgetReport, BudgetStatus};
pub use transaction::{
    aggregate_by_category, compare_date_desc, filter_by_date, group_by_timestamp,
    sort_descending_by_date, total_spending, CreateTransactionInput, NumberedTransaction,
    TimestampGroup, TransactionService,
};
