//! Core data models for the expense tracker
//!
//! This module contains the data structures that represent the domain:
//! users, transactions, categories and money.

pub mod category;
pub mod ids;
pub mod money;
pub mod transaction;
pub mod user;

pub use category::Category;
pub use ids::{TransactionId, UserId};
pub use money::Money;
pub use transaction::{parse_timestamp, Transaction, TransactionStatus, TIMESTAMP_FORMAT};
pub use user::User;
