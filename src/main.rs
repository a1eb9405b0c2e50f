use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use expense_tracker::cli::{
    authenticate, handle_export_command, handle_register_command, handle_report_command,
    handle_transaction_command, ExportArgs, ReportCommands, Shell, TransactionCommands, EMAIL_ENV,
};
use expense_tracker::config::{paths::TrackerPaths, settings::Settings};
use expense_tracker::logging::init_logger;
use expense_tracker::session::Session;
use expense_tracker::storage::Storage;

#[derive(Parser)]
#[command(
    name = "expense",
    version,
    about = "Single-user personal expense tracker",
    long_about = "Track day-to-day spending from the command line. Transactions are \
                  kept in a CSV ledger; accounts in a local SQLite database."
)]
struct Cli {
    /// Login email for commands that need one
    #[arg(long, global = true, env = EMAIL_ENV)]
    email: Option<String>,

    /// Log level (off, error, warn, info, debug, trace). RUST_LOG overrides it.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register,

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Spending reports, budget check and tax estimate
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export transactions to a file
    Export(ExportArgs),

    /// Start an interactive session
    Shell,

    /// Create the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    // Initialize paths and settings
    let paths = TrackerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Register) => {
            let session = Session::new(Storage::new(paths)?);
            handle_register_command(&session, cli.email)?;
        }
        Some(Commands::Transaction(cmd)) => {
            let mut session = Session::new(Storage::new(paths)?);
            authenticate(&mut session, cli.email)?;
            handle_transaction_command(&mut session, &settings, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            let mut session = Session::new(Storage::new(paths)?);
            authenticate(&mut session, cli.email)?;
            handle_report_command(&mut session, &settings, cmd)?;
        }
        Some(Commands::Export(args)) => {
            let mut session = Session::new(Storage::new(paths)?);
            authenticate(&mut session, cli.email)?;
            handle_export_command(&mut session, args)?;
        }
        Some(Commands::Shell) => {
            let session = Session::new(Storage::new(paths)?);
            let stdin = std::io::stdin();
            let hide_passwords = stdin.is_terminal();
            let mut shell = Shell::new(session, settings, stdin.lock(), std::io::stdout())
                .with_hidden_passwords(hide_passwords);
            shell.run()?;
        }
        Some(Commands::Init) => {
            println!("Initializing expense tracker at: {}", paths.base_dir().display());
            let storage = Storage::new(paths.clone())?;
            let ledger = storage.transactions();
            if !ledger.path().exists() {
                ledger.save()?;
            }
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Run 'expense register --email <EMAIL>' to create an account.");
        }
        Some(Commands::Config) => {
            println!("Expense Tracker Configuration");
            println!("=============================");
            println!("Data directory:    {}", paths.base_dir().display());
            println!("Settings file:     {}", paths.settings_file().display());
            println!("Users database:    {}", paths.users_db().display());
            println!("Transactions file: {}", paths.transactions_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:  {}", settings.currency_symbol);
            match settings.budget_limit {
                Some(limit) => println!("  Budget limit:     {}", settings.format_money(limit)),
                None => println!("  Budget limit:     (none)"),
            }
            let rates: Vec<String> = settings.tax_rates.iter().map(|r| r.to_string()).collect();
            println!("  Tax rates:        {}", rates.join(", "));
            println!("  Default tax rate: {}", settings.default_tax_rate);
        }
        None => {
            println!("Expense Tracker - personal spending from the command line");
            println!();
            println!("Run 'expense --help' for usage information.");
            println!("Run 'expense shell' to start an interactive session.");
        }
    }

    Ok(())
}
