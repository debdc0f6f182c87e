//! Phonebook command-line entry point.
//!
//! # Responsibility
//! - Map subcommands onto `PhonebookStore` operations.
//! - Own the store configuration and pass it to core explicitly.
//!
//! # Exit codes
//! - `0` success, `1` storage or file failure, `2` invalid input.

mod csv_rows;

use clap::{Parser, Subcommand};
use log::info;
use phonebook_core::{
    init_logging, open_db, Contact, PageRequest, PhonebookStore, RejectedRow, RepoError,
    SqliteContactRepository, StoreConfig, StoreError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Manage a small book of contacts stored in SQLite.
#[derive(Parser, Debug)]
#[command(name = "phonebook", version = phonebook_core::core_version())]
struct Cli {
    /// Path to the phonebook database file
    #[arg(long, env = "PHONEBOOK_DB", default_value = "phonebook.db")]
    db: PathBuf,

    /// Milliseconds to wait for a database locked by another process
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, default_value_t = phonebook_core::default_log_level().to_string())]
    log_level: String,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, env = "PHONEBOOK_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import contacts from a CSV file with header first_name,surname,phone
    Load { csv: String },
    /// Insert a contact or replace its phone
    Upsert {
        first_name: String,
        surname: String,
        phone: String,
    },
    /// Find contacts whose name or phone contains the pattern
    Search { pattern: String },
    /// Show one page of contacts ordered by name
    Page { limit: String, offset: String },
    /// Delete every contact whose first name, surname OR phone equals the key
    Delete { key: String },
    /// Show all contacts
    Show,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Upsert { .. } => "upsert",
            Self::Search { .. } => "search",
            Self::Page { .. } => "page",
            Self::Delete { .. } => "delete",
            Self::Show => "show",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("Logging disabled: {err}");
        }
    }

    let config = StoreConfig::file(&cli.db)
        .with_busy_timeout(Duration::from_millis(cli.busy_timeout_ms));

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if err.is_locked() {
                eprintln!("Another process holds the database; retry or raise --busy-timeout-ms");
            }
            err.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    Open(phonebook_core::DbError),
    Store(StoreError),
    Csv(csv_rows::CsvSourceError),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Store(StoreError::Input(_)) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }

    fn is_locked(&self) -> bool {
        match self {
            Self::Open(err) => err.is_locked(),
            Self::Store(StoreError::StorageUnavailable(RepoError::Db(err))) => err.is_locked(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "storage unavailable: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn run(config: &StoreConfig, command: Command) -> Result<(), CliError> {
    info!("event=cli_command module=cli status=start command={}", command.name());

    // Page arguments are checked before the database is opened.
    if let Command::Page { limit, offset } = &command {
        PageRequest::parse(limit, offset).map_err(StoreError::from)?;
    }

    let conn = open_db(config).map_err(CliError::Open)?;
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    match command {
        Command::Load { csv } => {
            let path = csv_rows::normalize_path(&csv);
            let rows = csv_rows::read_import_rows(&path).map_err(CliError::Csv)?;
            let report = store.bulk_import(rows)?;
            if report.rejected.is_empty() {
                println!("CSV imported: {} contact(s).", report.accepted);
            } else {
                println!("Imported {} contact(s); invalid rows:", report.accepted);
                for rejected in &report.rejected {
                    println!("  {}", format_rejected(rejected));
                }
            }
        }
        Command::Upsert {
            first_name,
            surname,
            phone,
        } => {
            store.upsert(first_name.trim(), surname.trim(), phone.trim())?;
            println!("Upserted.");
        }
        Command::Search { pattern } => {
            let found = store.search(pattern.trim())?;
            if found.is_empty() {
                println!("No matches.");
            } else {
                print_contacts(&found);
            }
        }
        Command::Page { limit, offset } => {
            let page = PageRequest::parse(&limit, &offset).map_err(StoreError::from)?;
            print_contacts(&store.list(page)?);
        }
        Command::Delete { key } => {
            let removed = store.delete(key.trim())?;
            println!("Deleted {removed} contact(s).");
        }
        Command::Show => {
            let all = store.list_all()?;
            if all.is_empty() {
                println!("Empty.");
            } else {
                print_contacts(&all);
            }
        }
    }

    Ok(())
}

fn print_contacts(contacts: &[Contact]) {
    for contact in contacts {
        println!(
            "  {} {} -> {}",
            contact.first_name, contact.surname, contact.phone
        );
    }
}

fn format_rejected(rejected: &RejectedRow) -> String {
    let field = |value: &Option<String>| {
        value
            .clone()
            .unwrap_or_else(|| "<missing>".to_string())
    };
    format!(
        "{} {} -> {} ({})",
        field(&rejected.row.first_name),
        field(&rejected.row.surname),
        field(&rejected.row.phone),
        rejected.reason
    )
}
