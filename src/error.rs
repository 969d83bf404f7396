//! Error types for the ATM teller.

use thiserror::Error;

/// Result type alias for teller operations
pub type Result<T> = std::result::Result<T, TellerError>;

/// Failures in the persistence layer.
///
/// Any of these is fatal for the current operation; the shell reports it
/// and returns to the menu rather than terminating the process.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open, read or write a backing table file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error while writing a table
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A table row that could not be parsed (wrong column count,
    /// non-numeric balance, bad timestamp)
    #[error("Malformed row {row} in {table}: {message}")]
    MalformedRow {
        table: &'static str,
        row: usize,
        message: String,
    },
}

/// User-input problems, detected before any state is touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Amount did not parse as a non-negative decimal with at most
    /// two fractional digits
    #[error("Invalid amount format: {0:?} (use e.g. 10 or 10.50)")]
    BadAmountFormat(String),

    /// Amount was zero
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// Amount exceeded the per-operation limit of 10000.00
    #[error("Amount exceeds limit (10000.00)")]
    AmountTooLarge,

    /// PIN was not exactly 4 digits
    #[error("PIN must be 4 digits")]
    BadPinFormat,

    /// Another active account already uses this PIN
    #[error("PIN already in use, choose a different PIN")]
    PinNotUnique,

    /// Transfer target equals the source account
    #[error("Cannot transfer to your own account")]
    SelfTransfer,

    /// Account deletion was requested without confirmation
    #[error("Account deletion not confirmed")]
    NotConfirmed,
}

/// Login failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No active account with the given number (absent or soft-deleted)
    #[error("Account not found")]
    NotFound,

    /// PIN digest did not match the stored hash
    #[error("Incorrect PIN")]
    BadPin,
}

/// Errors surfaced by the account service and record store.
#[derive(Error, Debug)]
pub enum TellerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A lookup failure for an account other than the authenticated one
    /// (e.g. a transfer target that is absent or deleted)
    #[error("Target account {0} not found")]
    AccountNotFound(String),

    /// Withdrawal or transfer amount exceeded the current balance
    #[error("Insufficient balance")]
    InsufficientFunds,
}
