//! Account row model, balance mutations and PIN handling.
//!
//! One `Account` corresponds to one row of the accounts table. Soft-deleted
//! rows stay in the table with `is_deleted` set; they are invisible to login
//! and to transfer-target lookup but their history is preserved.

use crate::amount::Amount;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One row of the accounts table.
///
/// # Invariants
///
/// - `account_number` is unique across active and deleted rows
/// - `balance` is never negative (enforced by [`Account::debit`])
/// - `pin_hash` is unique across active accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique fixed-format numeric account number.
    pub account_number: String,

    /// Display name of the holder.
    pub name: String,

    /// SHA-256 hex digest of the 4-digit PIN. Raw PINs are never stored.
    pub pin_hash: String,

    /// Free-text postal address.
    pub address: String,

    /// Current balance, two decimal places, non-negative.
    pub balance: Amount,

    /// Soft-delete flag, serialized as "0"/"1" in the table.
    #[serde(with = "flag01")]
    pub is_deleted: bool,
}

impl Account {
    /// Creates a new active account with a zero balance.
    ///
    /// The PIN is hashed here; the caller passes the raw 4-digit PIN once
    /// and it is never kept.
    pub fn new(account_number: &str, name: &str, pin: &str, address: &str) -> Self {
        Account {
            account_number: account_number.to_string(),
            name: name.to_string(),
            pin_hash: hash_pin(pin),
            address: address.to_string(),
            balance: Amount::ZERO,
            is_deleted: false,
        }
    }

    /// Returns `true` if the account has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Checks a candidate PIN against the stored digest.
    pub fn verify_pin(&self, pin: &str) -> bool {
        hash_pin(pin) == self.pin_hash
    }

    /// Adds funds to the balance.
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount;
    }

    /// Removes funds from the balance.
    ///
    /// Returns `false` without mutating when `amount` exceeds the current
    /// balance, keeping the non-negative invariant.
    pub fn debit(&mut self, amount: Amount) -> bool {
        if amount > self.balance {
            return false;
        }
        self.balance -= amount;
        true
    }
}

/// Computes the SHA-256 hex digest of a PIN.
pub fn hash_pin(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checks that a PIN is exactly 4 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::BadPinFormat)
    }
}

/// Serde adapter for the "0"/"1" flag encoding used by the tables.
mod flag01 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "expected \"0\" or \"1\" for is_deleted, got {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_new_account_is_active_with_zero_balance() {
        let account = Account::new("123456789", "Ahmed", "5678", "456 Gulshan Ave, Lahore");
        assert!(account.is_active());
        assert!(account.balance.is_zero());
        assert_eq!(account.pin_hash.len(), 64);
    }

    #[test]
    fn test_credit_increases_balance() {
        let mut account = Account::new("123456789", "Ahmed", "5678", "addr");
        account.credit(amt("10.00"));
        account.credit(amt("2.50"));
        assert_eq!(account.balance.to_string(), "12.50");
    }

    #[test]
    fn test_debit_decreases_balance() {
        let mut account = Account::new("123456789", "Ahmed", "5678", "addr");
        account.credit(amt("10.00"));
        assert!(account.debit(amt("3.50")));
        assert_eq!(account.balance.to_string(), "6.50");
    }

    #[test]
    fn test_debit_fails_with_insufficient_funds() {
        let mut account = Account::new("123456789", "Ahmed", "5678", "addr");
        account.credit(amt("10.00"));
        assert!(!account.debit(amt("15.00")));
        assert_eq!(account.balance.to_string(), "10.00");
    }

    #[test]
    fn test_debit_exact_balance_reaches_zero() {
        let mut account = Account::new("123456789", "Ahmed", "5678", "addr");
        account.credit(amt("10.00"));
        assert!(account.debit(amt("10.00")));
        assert!(account.balance.is_zero());
    }

    #[test]
    fn test_verify_pin_matches_only_original() {
        let account = Account::new("123456789", "Ahmed", "5678", "addr");
        assert!(account.verify_pin("5678"));
        assert!(!account.verify_pin("5679"));
    }

    #[test]
    fn test_hash_pin_never_echoes_raw_pin() {
        let digest = hash_pin("1234");
        assert_eq!(digest.len(), 64);
        assert!(!digest.contains("1234"));
        assert_eq!(digest, hash_pin("1234"));
    }

    #[test]
    fn test_validate_pin_format() {
        assert!(validate_pin("0042").is_ok());
        assert_eq!(validate_pin("123"), Err(ValidationError::BadPinFormat));
        assert_eq!(validate_pin("12345"), Err(ValidationError::BadPinFormat));
        assert_eq!(validate_pin("12a4"), Err(ValidationError::BadPinFormat));
        assert_eq!(validate_pin(""), Err(ValidationError::BadPinFormat));
    }
}
