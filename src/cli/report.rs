//! Report CLI commands
//!
//! Category breakdown, budget check and tax estimate.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::report::format_percentage;
use crate::error::TrackerResult;
use crate::models::Money;
use crate::reports::SpendingReport;
use crate::services::{
    estimate_tax, filter_by_date, total_spending, validate_tax_input, BudgetReport, BudgetStatus,
};
use crate::session::Session;
use crate::storage::write_atomic;

use super::transaction::{parse_amount, parse_date};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Spending by category with a bar chart
    Breakdown {
        /// Only include this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Also write the breakdown as CSV to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare total spending with a budget limit
    Budget {
        /// Budget limit, defaults to the configured one
        #[arg(short, long)]
        limit: Option<String>,
    },
    /// Estimate tax on an income
    Tax {
        /// Annual income
        #[arg(short, long)]
        income: String,
        /// Tax rate in percent, defaults to the configured rate
        #[arg(short, long)]
        rate: Option<f64>,
    },
}

/// Format a budget check for terminal display
pub fn format_budget_report(report: &BudgetReport, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!("Total spending: {}\n", settings.format_money(report.total)));
    output.push_str(&format!("Budget limit:   {}\n", settings.format_money(report.limit)));
    if let Some(pct) = report.percent_used() {
        output.push_str(&format!("Used:           {}\n", format_percentage(pct)));
    }

    match report.status {
        BudgetStatus::WithinBudget => output.push_str(&format!(
            "Within budget. {} remaining.\n",
            settings.format_money(report.remaining())
        )),
        BudgetStatus::OverBudget => output.push_str(&format!(
            "Warning: you are over budget by {}!\n",
            settings.format_money(report.excess())
        )),
    }

    output
}

/// Format a tax estimate for terminal display
pub fn format_tax_estimate(income: Money, rate: f64, tax: Money, settings: &Settings) -> String {
    format!(
        "Income:         {}\nTax rate:       {}%\nEstimated tax:  {}\n",
        settings.format_money(income),
        rate,
        settings.format_money(tax)
    )
}

/// Handle a report command
pub fn handle_report_command(
    session: &mut Session,
    settings: &Settings,
    cmd: ReportCommands,
) -> TrackerResult<()> {
    match cmd {
        ReportCommands::Breakdown { date, output } => {
            let ledger = session.ledger()?;
            let report = match date {
                Some(date) => {
                    SpendingReport::generate(&filter_by_date(ledger.all(), parse_date(&date)?))
                }
                None => SpendingReport::generate(ledger.all()),
            };

            print!("{}", report.format_terminal(&settings.currency_symbol));

            if let Some(path) = output {
                write_atomic(&path, |writer| report.export_csv(writer))?;
                println!("Breakdown written to: {}", path.display());
            }
        }

        ReportCommands::Budget { limit } => {
            let limit = match limit {
                Some(limit) => Some(parse_amount(&limit)?),
                None => settings.budget_limit,
            };

            let total = total_spending(session.ledger()?.all());

            match limit {
                Some(limit) if limit.is_positive() => {
                    print!("{}", format_budget_report(&BudgetReport::new(total, limit), settings));
                }
                _ => {
                    println!("Total spending: {}", settings.format_money(total));
                    println!("No budget limit set. Use --limit or set budget_limit in the config file.");
                }
            }
        }

        ReportCommands::Tax { income, rate } => {
            session.require_auth()?;

            let income = parse_amount(&income)?;
            let rate = rate.unwrap_or(settings.default_tax_rate);
            validate_tax_input(income, rate)?;

            let tax = estimate_tax(income, rate);
            print!("{}", format_tax_estimate(income, rate, tax, settings));
        }
    }

    Ok(())
}
