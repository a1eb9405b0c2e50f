//! Expense Tracker - single-user personal finance tracking
//!
//! This library provides the core functionality for the `expense` command:
//! a SQLite credential store and a CSV transaction ledger, with views for
//! date search, category breakdown, budget checks and tax estimates.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, categories, money, users)
//! - `storage`: SQLite credential store and CSV ledger file
//! - `services`: Business logic layer
//! - `session`: Login state and the cached ledger
//! - `reports`: Spending breakdown
//! - `export`: CSV, JSON and YAML export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers and the interactive shell
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::config::{paths::TrackerPaths, settings::Settings};
//!
//! let paths = TrackerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{TrackerError, TrackerResult};
