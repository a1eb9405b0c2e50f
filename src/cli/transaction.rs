//! Transaction CLI commands
//!
//! Implements CLI commands for adding, viewing, searching and deleting
//! ledger entries.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{
    format_grouped_transactions, format_transaction_details, format_transaction_table,
};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, Money, TransactionStatus};
use crate::services::{CreateTransactionInput, TransactionService};
use crate::session::Session;

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// What the money was spent on
        description: String,
        /// Amount spent (e.g. "250", "12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category (Food, Transport, Utilities, Entertainment, Healthcare, Groceries, Other)
        #[arg(short, long)]
        category: String,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Time of day (HH:MM or HH:MM:SS), defaults to now
        #[arg(short, long)]
        time: Option<String>,
        /// Status (pending, completed), defaults to pending
        #[arg(short, long)]
        status: Option<String>,
    },
    /// List all transactions, newest first
    List,
    /// Show the transactions of one day, grouped by time
    Search {
        /// Date to search (YYYY-MM-DD)
        date: String,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (e.g. "7" or "#7")
        id: String,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID (e.g. "7" or "#7")
        #[arg(required_unless_present = "position")]
        id: Option<String>,
        /// Position in the `list` view instead of an ID
        #[arg(short, long, conflicts_with = "id")]
        position: Option<usize>,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(input: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        TrackerError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", input))
    })
}

/// Parse a HH:MM or HH:MM:SS time
pub fn parse_time(input: &str) -> TrackerResult<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| {
            TrackerError::Validation(format!("Invalid time format: '{}'. Use HH:MM", input))
        })
}

/// The current local time to the minute
pub fn current_time() -> NaiveTime {
    let now = Local::now().time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
}

/// Parse an amount typed by the user
pub fn parse_amount(input: &str) -> TrackerResult<Money> {
    Money::parse(input).map_err(|e| {
        TrackerError::Validation(format!(
            "Invalid amount format: '{}'. Use a number like '250' or '12.50'. Error: {}",
            input, e
        ))
    })
}

/// Parse a category name
pub fn parse_category(input: &str) -> TrackerResult<Category> {
    input.parse().map_err(TrackerError::Validation)
}

/// Parse a status name
pub fn parse_status(input: &str) -> TrackerResult<TransactionStatus> {
    input.parse().map_err(TrackerError::Validation)
}

/// Handle a transaction command
pub fn handle_transaction_command(
    session: &mut Session,
    settings: &Settings,
    cmd: TransactionCommands,
) -> TrackerResult<()> {
    let symbol = settings.currency_symbol.as_str();
    let mut service = TransactionService::new(session.ledger()?);

    match cmd {
        TransactionCommands::Add {
            description,
            amount,
            category,
            date,
            time,
            status,
        } => {
            let input = CreateTransactionInput {
                date: match date {
                    Some(date) => parse_date(&date)?,
                    None => Local::now().date_naive(),
                },
                time: match time {
                    Some(time) => parse_time(&time)?,
                    None => current_time(),
                },
                description,
                category: parse_category(&category)?,
                amount: parse_amount(&amount)?,
                status: match status {
                    Some(status) => parse_status(&status)?,
                    None => TransactionStatus::default(),
                },
            };

            let txn = service.create(input)?;

            println!("Created transaction:");
            print!("{}", format_transaction_details(&txn, symbol));
        }

        TransactionCommands::List => {
            let transactions = service.view_all();
            print!("{}", format_transaction_table(transactions, symbol));
            println!("\nShowing {} transactions", transactions.len());
        }

        TransactionCommands::Search { date } => {
            let date = parse_date(&date)?;
            let groups = service.search_by_date(date);
            print!("{}", format_grouped_transactions(&groups, symbol));
        }

        TransactionCommands::Show { id } => {
            let txn = service
                .find(&id)
                .ok_or_else(|| TrackerError::transaction_not_found(&id))?;
            print!("{}", format_transaction_details(txn, symbol));
        }

        TransactionCommands::Delete {
            id,
            position,
            force,
        } => {
            // Positions refer to the sorted list view
            service.view_all();

            let position = match (id, position) {
                (_, Some(position)) => position,
                (Some(id), None) => {
                    let txn_id = service
                        .find(&id)
                        .map(|t| t.id)
                        .ok_or_else(|| TrackerError::transaction_not_found(&id))?;
                    service
                        .position(txn_id)
                        .ok_or_else(|| TrackerError::transaction_not_found(&id))?
                }
                (None, None) => {
                    return Err(TrackerError::Validation(
                        "Give a transaction ID or --position".into(),
                    ))
                }
            };

            let txn = service.transactions().get(position).ok_or_else(|| {
                TrackerError::transaction_not_found(format!("position {}", position))
            })?;

            if !force {
                println!("About to delete transaction:");
                print!("{}", format_transaction_details(txn, symbol));
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = service.delete_at_position(position)?;
            println!("Deleted transaction: {} ({})", deleted.id, deleted);
        }
    }

    Ok(())
}
