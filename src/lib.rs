//! # ATM Teller
//!
//! A single-user, file-backed simulation of ATM operations: login, balance
//! inquiry, deposits, withdrawals, transfers, PIN changes, soft deletion and
//! transaction history, persisted as two delimited-text tables.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: money uses 2 decimal places via `rust_decimal`
//! - **Whole-table snapshots**: the accounts table is rewritten on every
//!   mutation; the transaction log is append-only
//! - **Digests, never PINs**: PINs are stored and compared as SHA-256 hashes
//! - **Soft deletion**: deleted accounts stay in the table and keep their
//!   history, but are invisible to login and transfer lookup
//!
//! ## Example
//!
//! ```no_run
//! use atm_teller::{Account, AccountService, Amount, RecordStore};
//! use std::str::FromStr;
//!
//! let store = RecordStore::new(".");
//! store.initialize().unwrap();
//! store.save_accounts(&[Account::new("123456789", "Ahmed", "5678", "Lahore")]).unwrap();
//!
//! let service = AccountService::new(store);
//! let account = service.authenticate("123456789", "5678").unwrap();
//! service.deposit(&account.account_number, Amount::from_str("100.00").unwrap()).unwrap();
//! ```

pub mod account;
pub mod amount;
pub mod error;
pub mod service;
pub mod shell;
pub mod store;
pub mod transaction;

pub use account::{hash_pin, validate_pin, Account};
pub use amount::Amount;
pub use error::{AuthError, Result, StorageError, TellerError, ValidationError};
pub use service::AccountService;
pub use shell::Shell;
pub use store::{InitOutcome, RecordStore, ACCOUNTS_FILE, TRANSACTIONS_FILE};
pub use transaction::{Direction, TransactionRecord, TxKind};
