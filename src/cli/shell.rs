//! Interactive shell
//!
//! A prompt-driven session: register, log in, work with the ledger, log out.
//! Errors are printed and the loop carries on. Input and output are generic
//! so a session can be scripted.

use std::io::{BufRead, Write};

use crate::config::Settings;
use crate::display::{
    format_grouped_transactions, format_transaction_details, format_transaction_table,
};
use crate::error::{TrackerError, TrackerResult};
use crate::export::{export_transactions, ExportFormat};
use crate::models::{Category, TransactionStatus};
use crate::reports::SpendingReport;
use crate::services::{
    estimate_tax, filter_by_date, sort_descending_by_date, total_spending,
    validate_tax_input, BudgetReport, CreateTransactionInput, TransactionService,
};
use crate::session::Session;
use crate::storage::write_atomic;

use super::report::{format_budget_report, format_tax_estimate};
use super::transaction::{
    current_time, parse_amount, parse_category, parse_date, parse_status, parse_time,
};

const HELP: &str = "\
Commands:
  register   Create an account
  login      Log in
  logout     Log out (asks for confirmation)
  add        Add a transaction
  list       Show all transactions, newest first
  search     Show the transactions of one day
  delete     Delete a transaction by its position in 'list'
  breakdown  Spending by category
  budget     Check spending against a budget
  tax        Estimate tax on an income
  export     Export transactions to a file
  reload     Reread the ledger file
  help       Show this help
  quit       Leave the shell
";

enum Flow {
    Continue,
    Quit,
}

/// Interactive session over an input and an output stream
pub struct Shell<R, W> {
    session: Session,
    settings: Settings,
    input: R,
    output: W,
    /// Read passwords without echo from the terminal
    hide_passwords: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Create a shell that reads passwords from `input` like any other line
    pub fn new(session: Session, settings: Settings, input: R, output: W) -> Self {
        Self {
            session,
            settings,
            input,
            output,
            hide_passwords: false,
        }
    }

    /// Read passwords from the terminal without echo
    pub fn with_hidden_passwords(mut self, hide: bool) -> Self {
        self.hide_passwords = hide;
        self
    }

    /// Give back the session and output stream
    pub fn into_parts(self) -> (Session, W) {
        (self.session, self.output)
    }

    /// Run until `quit` or end of input
    pub fn run(&mut self) -> TrackerResult<()> {
        writeln!(self.output, "Expense Tracker. Type 'help' for commands.")?;

        loop {
            let prompt = match self.session.require_auth() {
                Ok(email) => format!("{}> ", email),
                Err(_) => "> ".to_string(),
            };

            let Some(line) = self.prompt(&prompt)? else {
                break;
            };
            let command = line.trim().to_ascii_lowercase();
            if command.is_empty() {
                continue;
            }

            match self.dispatch(&command) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    tracing::debug!(command = %command, error = %e, "shell command failed");
                    writeln!(self.output, "Error: {}", e)?;
                }
            }
        }

        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    fn dispatch(&mut self, command: &str) -> TrackerResult<Flow> {
        match command {
            "help" | "?" => write!(self.output, "{}", HELP)?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "register" => self.register()?,
            "login" => self.login()?,
            "logout" => self.logout()?,
            "add" => self.add()?,
            "list" => self.list()?,
            "search" => self.search()?,
            "delete" => self.delete()?,
            "breakdown" => self.breakdown()?,
            "budget" => self.budget()?,
            "tax" => self.tax()?,
            "export" => self.export()?,
            "reload" => self.reload()?,
            other => writeln!(
                self.output,
                "Unknown command '{}'. Type 'help' for commands.",
                other
            )?,
        }
        Ok(Flow::Continue)
    }

    /// Print `label` and read one line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> TrackerResult<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn prompt_secret(&mut self, label: &str) -> TrackerResult<Option<String>> {
        if !self.hide_passwords {
            return self.prompt(label);
        }
        self.output.flush()?;
        rpassword::prompt_password(label)
            .map(Some)
            .map_err(|e| TrackerError::Io(format!("Failed to read password: {}", e)))
    }

    /// Ask a yes/no question; anything but y/yes is no
    fn confirm(&mut self, label: &str) -> TrackerResult<bool> {
        let answer = self.prompt(label)?.unwrap_or_default();
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn register(&mut self) -> TrackerResult<()> {
        let Some(email) = self.prompt("Email: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt_secret("Password: ")? else {
            return Ok(());
        };
        let Some(confirm) = self.prompt_secret("Confirm password: ")? else {
            return Ok(());
        };

        let user = self.session.register(email.trim(), &password, &confirm)?;
        writeln!(self.output, "Registered {}. You can now log in.", user.email)?;
        Ok(())
    }

    fn login(&mut self) -> TrackerResult<()> {
        let Some(email) = self.prompt("Email: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt_secret("Password: ")? else {
            return Ok(());
        };

        let user = self.session.login(email.trim(), &password)?;
        writeln!(self.output, "Logged in as {}.", user.email)?;
        Ok(())
    }

    fn logout(&mut self) -> TrackerResult<()> {
        self.session.request_logout()?;

        if self.confirm("Are you sure you want to log out? [y/N] ")? {
            self.session.confirm_logout();
            writeln!(self.output, "Logged out.")?;
        } else {
            self.session.cancel_logout();
            writeln!(self.output, "Logout cancelled.")?;
        }
        Ok(())
    }

    fn add(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;

        let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        let category_prompt = format!("Category ({}): ", categories.join(", "));

        let Some(description) = self.prompt("Description: ")? else {
            return Ok(());
        };
        let Some(category) = self.prompt(&category_prompt)? else {
            return Ok(());
        };
        let category = parse_category(&category)?;
        let Some(amount) = self.prompt("Amount: ")? else {
            return Ok(());
        };
        let amount = parse_amount(&amount)?;
        let Some(date) = self.prompt("Date (YYYY-MM-DD, blank for today): ")? else {
            return Ok(());
        };
        let date = if date.trim().is_empty() {
            chrono::Local::now().date_naive()
        } else {
            parse_date(&date)?
        };
        let Some(time) = self.prompt("Time (HH:MM, blank for now): ")? else {
            return Ok(());
        };
        let time = if time.trim().is_empty() {
            current_time()
        } else {
            parse_time(&time)?
        };
        let Some(status) = self.prompt("Status (Pending/Completed, blank for Pending): ")? else {
            return Ok(());
        };
        let status = if status.trim().is_empty() {
            TransactionStatus::default()
        } else {
            parse_status(&status)?
        };

        let input = CreateTransactionInput {
            date,
            time,
            description,
            category,
            amount,
            status,
        };
        let txn = TransactionService::new(self.session.ledger()?).create(input)?;

        writeln!(self.output, "Transaction added: {} {}", txn.id, txn)?;
        Ok(())
    }

    fn list(&mut self) -> TrackerResult<()> {
        let mut service = TransactionService::new(self.session.ledger()?);
        let transactions = service.view_all();

        write!(
            self.output,
            "{}",
            format_transaction_table(transactions, &self.settings.currency_symbol)
        )?;
        Ok(())
    }

    fn search(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;

        let Some(date) = self.prompt("Date (YYYY-MM-DD): ")? else {
            return Ok(());
        };
        let date = parse_date(&date)?;

        let groups = TransactionService::new(self.session.ledger()?).search_by_date(date);

        write!(
            self.output,
            "{}",
            format_grouped_transactions(&groups, &self.settings.currency_symbol)
        )?;
        Ok(())
    }

    fn delete(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;

        let Some(position) = self.prompt("Position to delete (as shown by 'list'): ")? else {
            return Ok(());
        };
        let position: usize = position.trim().parse().map_err(|_| {
            TrackerError::Validation(format!("Invalid position: '{}'", position.trim()))
        })?;

        let details = {
            let mut service = TransactionService::new(self.session.ledger()?);
            service.view_all();
            let txn = service.transactions().get(position).ok_or_else(|| {
                TrackerError::transaction_not_found(format!("position {}", position))
            })?;
            format_transaction_details(txn, &self.settings.currency_symbol)
        };

        write!(self.output, "{}", details)?;
        if !self.confirm("Delete this transaction? [y/N] ")? {
            writeln!(self.output, "Nothing deleted.")?;
            return Ok(());
        }

        let deleted = TransactionService::new(self.session.ledger()?).delete_at_position(position)?;
        writeln!(self.output, "Deleted transaction {}.", deleted.id)?;
        Ok(())
    }

    fn breakdown(&mut self) -> TrackerResult<()> {
        let report = SpendingReport::generate(self.session.ledger()?.all());
        write!(
            self.output,
            "{}",
            report.format_terminal(&self.settings.currency_symbol)
        )?;
        Ok(())
    }

    fn budget(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;

        let configured = match self.settings.budget_limit {
            Some(limit) => self.settings.format_money(limit),
            None => "none".to_string(),
        };
        let Some(limit) = self.prompt(&format!("Budget limit (blank for {}): ", configured))? else {
            return Ok(());
        };
        let limit = if limit.trim().is_empty() {
            self.settings.budget_limit
        } else {
            Some(parse_amount(&limit)?)
        };

        let total = total_spending(self.session.ledger()?.all());

        match limit {
            Some(limit) if limit.is_positive() => {
                let report = BudgetReport::new(total, limit);
                write!(self.output, "{}", format_budget_report(&report, &self.settings))?;
            }
            _ => {
                writeln!(
                    self.output,
                    "Total spending: {}",
                    self.settings.format_money(total)
                )?;
                writeln!(self.output, "Set a budget greater than zero to check it.")?;
            }
        }
        Ok(())
    }

    fn tax(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;

        let Some(income) = self.prompt("Annual income: ")? else {
            return Ok(());
        };
        let income = parse_amount(&income)?;

        let offered: Vec<String> = self.settings.tax_rates.iter().map(|r| r.to_string()).collect();
        let rate_prompt = format!(
            "Tax rate % ({}; blank for {}): ",
            offered.join(", "),
            self.settings.default_tax_rate
        );
        let Some(rate) = self.prompt(&rate_prompt)? else {
            return Ok(());
        };
        let rate = if rate.trim().is_empty() {
            self.settings.default_tax_rate
        } else {
            rate.trim().parse::<f64>().map_err(|_| {
                TrackerError::Validation(format!("Invalid tax rate: '{}'", rate.trim()))
            })?
        };
        validate_tax_input(income, rate)?;

        if !income.is_positive() {
            writeln!(self.output, "Enter an income greater than zero to estimate tax.")?;
            return Ok(());
        }

        let tax = estimate_tax(income, rate);
        write!(
            self.output,
            "{}",
            format_tax_estimate(income, rate, tax, &self.settings)
        )?;
        Ok(())
    }

    fn export(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;

        let Some(path) = self.prompt("Export to file: ")? else {
            return Ok(());
        };
        let path = path.trim().to_string();
        if path.is_empty() {
            return Err(TrackerError::Validation("No file given".into()));
        }
        let Some(format) = self.prompt("Format (csv/json/yaml, blank for csv): ")? else {
            return Ok(());
        };
        let format = ExportFormat::from_name(&format).ok_or_else(|| {
            TrackerError::Validation(format!("Unknown export format: '{}'", format.trim()))
        })?;
        let Some(date) = self.prompt("Only this day (YYYY-MM-DD, blank for all): ")? else {
            return Ok(());
        };

        let ledger = self.session.ledger()?;
        let transactions = if date.trim().is_empty() {
            sort_descending_by_date(ledger.all())
        } else {
            filter_by_date(ledger.all(), parse_date(&date)?)
        };

        write_atomic(&path, |writer| export_transactions(&transactions, format, writer))?;
        writeln!(
            self.output,
            "Exported {} transactions to: {}",
            transactions.len(),
            path
        )?;
        Ok(())
    }

    fn reload(&mut self) -> TrackerResult<()> {
        self.session.require_auth()?;
        self.session.invalidate_ledger();
        let count = self.session.ledger()?.count();
        writeln!(self.output, "Reloaded {} transactions.", count)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TrackerPaths;
    use crate::storage::{Storage, TransactionRepository};
    use std::io::Cursor;
    use tempfile::TempDir;

    const SIGN_UP: &str = "register\nme@example.com\npw\npw\nlogin\nme@example.com\npw\n";

    fn run_script(temp_dir: &TempDir, script: &str) -> (Session, String) {
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let session = Session::new(Storage::new(paths).unwrap());
        let mut shell = Shell::new(
            session,
            Settings::default(),
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        );
        shell.run().unwrap();

        let (session, output) = shell.into_parts();
        (session, String::from_utf8(output).unwrap())
    }

    fn rows_on_disk(temp_dir: &TempDir) -> usize {
        let mut ledger = TransactionRepository::new(temp_dir.path().join("transactions.csv"));
        ledger.load().unwrap();
        ledger.count()
    }

    fn add(description: &str, amount: &str, date: &str, time: &str) -> String {
        format!("add\n{}\nFood\n{}\n{}\n{}\n\n", description, amount, date, time)
    }

    #[test]
    fn test_register_login_add_list() {
        let temp_dir = TempDir::new().unwrap();
        let script = format!(
            "{}{}list\nquit\n",
            SIGN_UP,
            add("Lunch", "250", "2024-01-01", "12:30")
        );

        let (session, output) = run_script(&temp_dir, &script);

        assert!(output.contains("Registered me@example.com"));
        assert!(output.contains("Logged in as me@example.com."));
        assert!(output.contains("Transaction added: #1 2024-01-01 12:30:00 Lunch - 250.00 (Pending)"));
        assert!(output.contains("₹250.00"));
        assert!(output.ends_with("Goodbye.\n"));
        assert!(session.is_authenticated());
        assert_eq!(rows_on_disk(&temp_dir), 1);
    }

    #[test]
    fn test_commands_need_login_and_loop_continues() {
        let temp_dir = TempDir::new().unwrap();
        let (_, output) = run_script(&temp_dir, "list\nfrobnicate\nhelp\n");

        assert!(output.contains("Error: You must be logged in to do that"));
        assert!(output.contains("Unknown command 'frobnicate'"));
        assert!(output.contains("breakdown  Spending by category"));
    }

    #[test]
    fn test_wrong_password_is_generic_error() {
        let temp_dir = TempDir::new().unwrap();
        let script = "register\nme@example.com\npw\npw\nlogin\nme@example.com\nnope\n";
        let (session, output) = run_script(&temp_dir, script);

        assert!(output.contains("Error: Invalid email or password"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_mismatched_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        let (_, output) = run_script(&temp_dir, "register\nme@example.com\npw\npx\n");
        assert!(output.contains("Passwords do not match"));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let script = format!("{}{}", SIGN_UP, add("Nothing", "0", "2024-01-01", "09:00"));

        let (_, output) = run_script(&temp_dir, &script);

        assert!(output.contains("Error: Validation error: Amount must be greater than zero"));
        assert_eq!(rows_on_disk(&temp_dir), 0);
    }

    #[test]
    fn test_logout_confirmation() {
        let temp_dir = TempDir::new().unwrap();

        let (session, output) = run_script(&temp_dir, &format!("{}logout\nn\n", SIGN_UP));
        assert!(output.contains("Logout cancelled."));
        assert!(session.is_authenticated());

        let (session, output) = run_script(
            &temp_dir,
            "login\nme@example.com\npw\nlogout\ny\n",
        );
        assert!(output.contains("Logged out."));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_search_groups_by_time() {
        let temp_dir = TempDir::new().unwrap();
        let script = format!(
            "{}{}{}{}search\n2024-01-01\n",
            SIGN_UP,
            add("Coffee", "3", "2024-01-01", "09:00"),
            add("Bus", "2", "2024-01-02", "09:00"),
            add("Bagel", "4", "2024-01-01", "09:00"),
        );

        let (_, output) = run_script(&temp_dir, &script);
        let search = &output[output.rfind("Date (YYYY-MM-DD): ").unwrap()..];

        assert!(search.contains("2024-01-01 09:00:00"));
        assert!(search.contains("Coffee"));
        assert!(search.contains("Bagel"));
        assert!(!search.contains("Bus"));
    }

    #[test]
    fn test_delete_most_recent() {
        let temp_dir = TempDir::new().unwrap();
        let script = format!(
            "{}{}{}{}delete\n0\ny\n",
            SIGN_UP,
            add("Old", "1", "2024-01-01", "09:00"),
            add("Newest", "3", "2024-01-03", "09:00"),
            add("Middle", "2", "2024-01-02", "09:00"),
        );

        let (mut session, output) = run_script(&temp_dir, &script);

        assert!(output.contains("Description: Newest"));
        assert!(output.contains("Deleted transaction #2."));
        assert_eq!(rows_on_disk(&temp_dir), 2);
        let remaining: Vec<_> = session
            .ledger()
            .unwrap()
            .all()
            .iter()
            .map(|t| t.description.clone())
            .collect();
        assert_eq!(remaining, vec!["Middle", "Old"]);
    }

    #[test]
    fn test_delete_declined_and_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let script = format!(
            "{}{}delete\n0\nn\ndelete\n5\n",
            SIGN_UP,
            add("Keep", "1", "2024-01-01", "09:00"),
        );

        let (_, output) = run_script(&temp_dir, &script);

        assert!(output.contains("Nothing deleted."));
        assert!(output.contains("Error: Transaction not found: position 5"));
        assert_eq!(rows_on_disk(&temp_dir), 1);
    }

    #[test]
    fn test_budget_and_tax() {
        let temp_dir = TempDir::new().unwrap();
        let script = format!(
            "{}{}budget\n100\nbudget\n\ntax\n50000\n\ntax\n0\n10\n",
            SIGN_UP,
            add("Rent", "150", "2024-01-01", "09:00"),
        );

        let (_, output) = run_script(&temp_dir, &script);

        assert!(output.contains("over budget by ₹50.00"));
        assert!(output.contains("Set a budget greater than zero to check it."));
        assert!(output.contains("Estimated tax:  ₹5000.00"));
        assert!(output.contains("Enter an income greater than zero"));
    }

    #[test]
    fn test_export_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let export_path = temp_dir.path().join("out.csv");
        let script = format!(
            "{}{}export\n{}\n\n\nreload\n",
            SIGN_UP,
            add("Snack", "5", "2024-01-01", "09:00"),
            export_path.display()
        );

        let (_, output) = run_script(&temp_dir, &script);

        assert!(output.contains("Exported 1 transactions"));
        assert!(output.contains("Reloaded 1 transactions."));
        let exported = std::fs::read_to_string(&export_path).unwrap();
        assert!(exported.contains("2024-01-01 09:00:00,Snack,Food,5.00,Pending"));
    }
}
