//! Transaction log models.
//!
//! Every successful monetary operation appends exactly one row per affected
//! account to the transaction log. Rows are never mutated or deleted; the
//! log keeps audit semantics even for soft-deleted accounts.

use crate::amount::Amount;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp format used in the transactions table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The kind of monetary operation a log row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    /// Funds added to the acting account.
    Deposit,

    /// Funds removed from the acting account.
    Withdrawal,

    /// Funds moved between two accounts; logged once per side.
    Transfer,
}

/// Whether the row credits or debits the acting account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Credit,
    Debit,
}

/// One append-only row of the transactions table.
///
/// Column order is fixed:
/// `timestamp,account_number,type,amount,counterparty_account,direction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Event time, `YYYY-MM-DD HH:MM:SS`.
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,

    /// The acting account.
    pub account_number: String,

    /// Operation kind.
    #[serde(rename = "type")]
    pub kind: TxKind,

    /// Positive amount, two decimals.
    pub amount: Amount,

    /// The other side of a transfer; empty for deposits and withdrawals.
    pub counterparty_account: Option<String>,

    /// Credit or Debit relative to the acting account.
    pub direction: Direction,
}

impl TransactionRecord {
    fn new(
        account_number: &str,
        kind: TxKind,
        amount: Amount,
        counterparty_account: Option<&str>,
        direction: Direction,
    ) -> Self {
        TransactionRecord {
            timestamp: Local::now().naive_local(),
            account_number: account_number.to_string(),
            kind,
            amount,
            counterparty_account: counterparty_account.map(str::to_string),
            direction,
        }
    }

    /// Row for a successful deposit.
    pub fn deposit(account_number: &str, amount: Amount) -> Self {
        Self::new(account_number, TxKind::Deposit, amount, None, Direction::Credit)
    }

    /// Row for a successful withdrawal.
    pub fn withdrawal(account_number: &str, amount: Amount) -> Self {
        Self::new(account_number, TxKind::Withdrawal, amount, None, Direction::Debit)
    }

    /// Source-side row of a transfer, referencing the target account.
    pub fn transfer_debit(source: &str, target: &str, amount: Amount) -> Self {
        Self::new(source, TxKind::Transfer, amount, Some(target), Direction::Debit)
    }

    /// Target-side row of a transfer, referencing the source account.
    pub fn transfer_credit(target: &str, source: &str, amount: Amount) -> Self {
        Self::new(target, TxKind::Transfer, amount, Some(source), Direction::Credit)
    }
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` timestamp column.
mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn to_csv_line(record: &TransactionRecord) -> String {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(record).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_deposit_row_shape() {
        let record = TransactionRecord::deposit("123456789", amt("100.00"));
        assert_eq!(record.kind, TxKind::Deposit);
        assert_eq!(record.direction, Direction::Credit);
        assert!(record.counterparty_account.is_none());

        let line = to_csv_line(&record);
        assert!(line.contains(",123456789,Deposit,100.00,,Credit"));
    }

    #[test]
    fn test_withdrawal_row_shape() {
        let record = TransactionRecord::withdrawal("123456789", amt("50.00"));
        assert_eq!(record.kind, TxKind::Withdrawal);
        assert_eq!(record.direction, Direction::Debit);

        let line = to_csv_line(&record);
        assert!(line.contains(",123456789,Withdrawal,50.00,,Debit"));
    }

    #[test]
    fn test_transfer_rows_reference_each_other() {
        let debit = TransactionRecord::transfer_debit("123456789", "987654321", amt("25.00"));
        let credit = TransactionRecord::transfer_credit("987654321", "123456789", amt("25.00"));

        assert_eq!(debit.counterparty_account.as_deref(), Some("987654321"));
        assert_eq!(credit.counterparty_account.as_deref(), Some("123456789"));
        assert_eq!(debit.direction, Direction::Debit);
        assert_eq!(credit.direction, Direction::Credit);
    }

    #[test]
    fn test_timestamp_round_trips_through_format() {
        use chrono::Timelike;

        let record = TransactionRecord::deposit("123456789", amt("1.00"));
        let formatted = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let parsed = NaiveDateTime::parse_from_str(&formatted, TIMESTAMP_FORMAT).unwrap();
        // The column format has second precision; sub-second detail is dropped.
        assert_eq!(parsed, record.timestamp.with_nanosecond(0).unwrap());
    }
}
