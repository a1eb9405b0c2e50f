//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod export;
pub mod report;
pub mod shell;
pub mod transaction;
pub mod user;

pub use export::{handle_export_command, ExportArgs};
pub use report::{handle_report_command, ReportCommands};
pub use shell::Shell;
pub use transaction::{handle_transaction_command, TransactionCommands};
pub use user::{authenticate, handle_register_command, EMAIL_ENV, PASSWORD_ENV};
