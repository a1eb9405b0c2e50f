//! Reports module for the expense tracker
//!
//! Spending analysis over a view of the ledger.

pub mod spending;

pub use spending::{SpendingByCategory, SpendingReport};
