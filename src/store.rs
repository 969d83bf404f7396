//! Record store: CSV-backed persistence for the two tables.
//!
//! The accounts table is read and written as a whole-file snapshot; the
//! transactions table is append-only. The store is the single owner of both
//! files, and the account service never touches them directly.

use crate::account::Account;
use crate::error::StorageError;
use crate::transaction::TransactionRecord;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Default file name of the accounts table.
pub const ACCOUNTS_FILE: &str = "accounts.csv";

/// Default file name of the transactions table.
pub const TRANSACTIONS_FILE: &str = "transactions.csv";

const ACCOUNT_HEADERS: [&str; 6] = [
    "account_number",
    "name",
    "pin_hash",
    "address",
    "balance",
    "is_deleted",
];

const TRANSACTION_HEADERS: [&str; 6] = [
    "timestamp",
    "account_number",
    "type",
    "amount",
    "counterparty_account",
    "direction",
];

/// What `initialize` found or created, so the bootstrap knows whether
/// to seed demonstration accounts.
#[derive(Debug, Clone, Copy)]
pub struct InitOutcome {
    /// The accounts table was created fresh (missing or empty before).
    pub accounts_created: bool,

    /// The transactions table was created fresh.
    pub transactions_created: bool,
}

/// CSV-file persistence for accounts and the transaction log.
///
/// No caching: every call reads or rewrites the backing file, which is the
/// whole point of the whole-table snapshot model. Tables hold a handful of
/// rows; linear scans are fine.
pub struct RecordStore {
    accounts_path: PathBuf,
    transactions_path: PathBuf,
}

impl RecordStore {
    /// Creates a store over the two table files inside `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        RecordStore {
            accounts_path: data_dir.join(ACCOUNTS_FILE),
            transactions_path: data_dir.join(TRANSACTIONS_FILE),
        }
    }

    /// Creates a store over explicit file paths.
    pub fn with_paths(accounts_path: impl Into<PathBuf>, transactions_path: impl Into<PathBuf>) -> Self {
        RecordStore {
            accounts_path: accounts_path.into(),
            transactions_path: transactions_path.into(),
        }
    }

    /// Creates each backing table with its header row if absent or empty.
    ///
    /// Idempotent: an existing non-empty table is left untouched, so calling
    /// this twice never alters existing rows.
    pub fn initialize(&self) -> Result<InitOutcome, StorageError> {
        let accounts_created = ensure_table(&self.accounts_path, &ACCOUNT_HEADERS)?;
        let transactions_created = ensure_table(&self.transactions_path, &TRANSACTION_HEADERS)?;
        Ok(InitOutcome {
            accounts_created,
            transactions_created,
        })
    }

    /// Loads every row of the accounts table, soft-deleted rows included.
    ///
    /// A row that fails to parse (wrong column count, non-numeric balance)
    /// is fatal for the call and reported with its 1-indexed row number.
    pub fn load_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let file = File::open(&self.accounts_path)?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(BufReader::new(file));

        let mut accounts = Vec::new();
        for (row_idx, result) in reader.deserialize::<Account>().enumerate() {
            let row = row_idx + 2; // 1-indexed, accounting for header row
            let account = result.map_err(|e| StorageError::MalformedRow {
                table: "accounts",
                row,
                message: e.to_string(),
            })?;
            accounts.push(account);
        }
        Ok(accounts)
    }

    /// Rewrites the whole accounts table, header first.
    ///
    /// Every row is preserved, including soft-deleted ones.
    pub fn save_accounts(&self, accounts: &[Account]) -> Result<(), StorageError> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.accounts_path)?;
        writer.write_record(ACCOUNT_HEADERS)?;
        for account in accounts {
            writer.serialize(account)?;
        }
        writer.flush()?;
        debug!("Saved {} account rows", accounts.len());
        Ok(())
    }

    /// Appends one row to the transaction log without rewriting prior rows.
    ///
    /// If the log file is missing or empty the header is written first, so
    /// the log survives being removed between operations.
    pub fn append_transaction(&self, record: &TransactionRecord) -> Result<(), StorageError> {
        let needs_header = fs::metadata(&self.transactions_path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.transactions_path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(TRANSACTION_HEADERS)?;
        }
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads the log rows for one account, in original (chronological) order.
    ///
    /// Works for soft-deleted accounts too; history outlives deletion.
    pub fn load_transactions(&self, account_number: &str) -> Result<Vec<TransactionRecord>, StorageError> {
        let file = File::open(&self.transactions_path)?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (row_idx, result) in reader.deserialize::<TransactionRecord>().enumerate() {
            let row = row_idx + 2;
            let record: TransactionRecord = result.map_err(|e| StorageError::MalformedRow {
                table: "transactions",
                row,
                message: e.to_string(),
            })?;
            if record.account_number == account_number {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Writes the header row if the table file is missing or empty.
/// Returns `true` if the table was created.
fn ensure_table(path: &Path, headers: &[&str]) -> Result<bool, StorageError> {
    let exists = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    if exists {
        debug!("Table {} already initialized", path.display());
        return Ok(false);
    }

    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(headers)?;
    writer.flush()?;
    debug!("Created table {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use std::fs;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn store() -> (TempDir, RecordStore) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path());
        store.initialize().unwrap();
        (dir, store)
    }

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_initialize_creates_both_tables_with_headers() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path());

        let outcome = store.initialize().unwrap();
        assert!(outcome.accounts_created);
        assert!(outcome.transactions_created);

        let accounts = fs::read_to_string(dir.path().join(ACCOUNTS_FILE)).unwrap();
        assert!(accounts.starts_with("account_number,name,pin_hash,address,balance,is_deleted"));

        let transactions = fs::read_to_string(dir.path().join(TRANSACTIONS_FILE)).unwrap();
        assert!(transactions
            .starts_with("timestamp,account_number,type,amount,counterparty_account,direction"));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (dir, store) = store();
        let mut account = Account::new("123456789", "Ahmed", "5678", "addr");
        account.credit(amt("42.00"));
        store.save_accounts(&[account]).unwrap();

        let before = fs::read_to_string(dir.path().join(ACCOUNTS_FILE)).unwrap();
        let outcome = store.initialize().unwrap();
        let after = fs::read_to_string(dir.path().join(ACCOUNTS_FILE)).unwrap();

        assert!(!outcome.accounts_created);
        assert_eq!(before, after);
    }

    #[test]
    fn test_accounts_round_trip_preserves_deleted_rows() {
        let (_dir, store) = store();
        let mut alice = Account::new("123456789", "Ahmed", "5678", "456 Gulshan Ave, Lahore");
        alice.credit(amt("100.50"));
        let mut bob = Account::new("987654321", "Saqlain Rai", "1234", "123 Main St, Karachi");
        bob.is_deleted = true;

        store.save_accounts(&[alice.clone(), bob.clone()]).unwrap();
        let loaded = store.load_accounts().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].account_number, "123456789");
        assert_eq!(loaded[0].balance.to_string(), "100.50");
        assert!(!loaded[0].is_deleted);
        assert_eq!(loaded[1].account_number, "987654321");
        assert!(loaded[1].is_deleted);
        assert_eq!(loaded[1].pin_hash, bob.pin_hash);
    }

    #[test]
    fn test_load_accounts_fails_on_malformed_balance() {
        let (dir, store) = store();
        fs::write(
            dir.path().join(ACCOUNTS_FILE),
            "account_number,name,pin_hash,address,balance,is_deleted\n\
             123456789,Ahmed,abc,addr,not-a-number,0\n",
        )
        .unwrap();

        let err = store.load_accounts().unwrap_err();
        match err {
            StorageError::MalformedRow { table, row, .. } => {
                assert_eq!(table, "accounts");
                assert_eq!(row, 2);
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_load_accounts_fails_on_wrong_column_count() {
        let (dir, store) = store();
        fs::write(
            dir.path().join(ACCOUNTS_FILE),
            "account_number,name,pin_hash,address,balance,is_deleted\n\
             123456789,Ahmed,abc,addr\n",
        )
        .unwrap();

        assert!(matches!(
            store.load_accounts().unwrap_err(),
            StorageError::MalformedRow { .. }
        ));
    }

    #[test]
    fn test_append_preserves_log_order() {
        let (_dir, store) = store();
        store
            .append_transaction(&TransactionRecord::deposit("123456789", amt("100.00")))
            .unwrap();
        store
            .append_transaction(&TransactionRecord::withdrawal("123456789", amt("50.00")))
            .unwrap();
        store
            .append_transaction(&TransactionRecord::deposit("987654321", amt("7.00")))
            .unwrap();

        let history = store.load_transactions("123456789").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].amount.to_string(), "100.00");
        assert_eq!(history[1].amount.to_string(), "50.00");
    }

    #[test]
    fn test_load_transactions_filters_by_account() {
        let (_dir, store) = store();
        store
            .append_transaction(&TransactionRecord::deposit("123456789", amt("1.00")))
            .unwrap();
        store
            .append_transaction(&TransactionRecord::deposit("987654321", amt("2.00")))
            .unwrap();

        let history = store.load_transactions("987654321").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount.to_string(), "2.00");

        assert!(store.load_transactions("000000000").unwrap().is_empty());
    }

    #[test]
    fn test_append_recreates_header_after_log_removal() {
        let (dir, store) = store();
        fs::remove_file(dir.path().join(TRANSACTIONS_FILE)).unwrap();

        store
            .append_transaction(&TransactionRecord::deposit("123456789", amt("5.00")))
            .unwrap();

        let contents = fs::read_to_string(dir.path().join(TRANSACTIONS_FILE)).unwrap();
        assert!(contents
            .starts_with("timestamp,account_number,type,amount,counterparty_account,direction"));
        assert_eq!(store.load_transactions("123456789").unwrap().len(), 1);
    }
}
