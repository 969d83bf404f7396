//! ATM Teller CLI
//!
//! An interactive, file-backed ATM session: login with account number and
//! PIN, then a numbered menu of balance, deposit, withdrawal, transfer,
//! PIN change, history and account deletion operations.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- [data-dir]
//! ```
//!
//! The accounts and transactions tables live in `data-dir` (default: the
//! working directory) as `accounts.csv` and `transactions.csv`. On first
//! run the tables are created and two demonstration accounts are seeded.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use atm_teller::{Account, AccountService, RecordStore, Result, Shell, StorageError};
use log::info;
use std::env;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let data_dir = args.get(1).map(String::as_str).unwrap_or(".");

    let store = RecordStore::new(data_dir);
    let outcome = store.initialize()?;
    if outcome.accounts_created {
        store.save_accounts(&seed_accounts())?;
        info!("Seeded demonstration accounts");
    }

    let service = AccountService::new(store);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(&service, stdin.lock(), stdout.lock());
    shell.run().map_err(StorageError::Io)?;

    Ok(())
}

/// The two demonstration accounts created on a fresh accounts table.
fn seed_accounts() -> Vec<Account> {
    vec![
        Account::new("987654321", "Saqlain Rai", "1234", "123 Main St, Karachi"),
        Account::new("123456789", "Ahmed", "5678", "456 Gulshan Ave, Lahore"),
    ]
}
