//! Account service: validation and business rules over the record store.
//!
//! Every operation loads the accounts snapshot, validates, mutates, saves
//! and appends log rows, in that order. Nothing here caches state between
//! operations; the store's files are the single source of truth.

use crate::account::{self, Account};
use crate::amount::Amount;
use crate::error::{AuthError, Result, TellerError, ValidationError};
use crate::store::RecordStore;
use crate::transaction::TransactionRecord;
use log::{debug, warn};

/// Business-logic layer bound to one [`RecordStore`].
///
/// The service holds the store instance explicitly; there is no process-wide
/// singleton. A session is simply the account number the shell keeps after a
/// successful [`AccountService::authenticate`] call.
pub struct AccountService {
    store: RecordStore,
}

impl AccountService {
    /// Creates a service over the given store.
    pub fn new(store: RecordStore) -> Self {
        AccountService { store }
    }

    /// Access to the underlying store (bootstrap uses this for seeding).
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Verifies an account number and PIN against the active accounts.
    ///
    /// The PIN format is checked before any lookup, so a malformed PIN never
    /// reveals whether the account exists. Soft-deleted accounts fail with
    /// [`AuthError::NotFound`], same as absent ones.
    pub fn authenticate(&self, account_number: &str, pin: &str) -> Result<Account> {
        account::validate_pin(pin)?;

        let accounts = self.store.load_accounts()?;
        let account = find_active(&accounts, account_number).ok_or(AuthError::NotFound)?;

        if !account.verify_pin(pin) {
            warn!("Failed login attempt for account {account_number}");
            return Err(AuthError::BadPin.into());
        }
        debug!("Account {account_number} authenticated");
        Ok(account.clone())
    }

    /// Returns the current balance of an active account. Pure read.
    pub fn check_balance(&self, account_number: &str) -> Result<Amount> {
        let accounts = self.store.load_accounts()?;
        let account = find_active(&accounts, account_number).ok_or(AuthError::NotFound)?;
        Ok(account.balance)
    }

    /// Adds funds to an account and logs a Deposit/Credit row.
    pub fn deposit(&self, account_number: &str, amount: Amount) -> Result<Account> {
        validate_operation_amount(amount)?;

        let mut accounts = self.store.load_accounts()?;
        let idx = position_active(&accounts, account_number).ok_or(AuthError::NotFound)?;

        accounts[idx].credit(amount);
        self.store.save_accounts(&accounts)?;
        self.store
            .append_transaction(&TransactionRecord::deposit(account_number, amount))?;

        debug!("Deposited {amount} to account {account_number}");
        Ok(accounts[idx].clone())
    }

    /// Removes funds from an account and logs a Withdrawal/Debit row.
    ///
    /// Fails with [`TellerError::InsufficientFunds`] when the amount exceeds
    /// the current balance; the balance is left unchanged.
    pub fn withdraw(&self, account_number: &str, amount: Amount) -> Result<Account> {
        validate_operation_amount(amount)?;

        let mut accounts = self.store.load_accounts()?;
        let idx = position_active(&accounts, account_number).ok_or(AuthError::NotFound)?;

        if !accounts[idx].debit(amount) {
            warn!("Rejected withdrawal of {amount} from account {account_number}: insufficient funds");
            return Err(TellerError::InsufficientFunds);
        }
        self.store.save_accounts(&accounts)?;
        self.store
            .append_transaction(&TransactionRecord::withdrawal(account_number, amount))?;

        debug!("Withdrew {amount} from account {account_number}");
        Ok(accounts[idx].clone())
    }

    /// Moves funds between two active accounts.
    ///
    /// One whole-table save persists both balance changes together, then the
    /// debit row and the credit row are appended, in that fixed order. A
    /// failure at any step aborts the operation with an error; this is the
    /// best-effort ordering, not a crash-safe transaction.
    pub fn transfer(
        &self,
        account_number: &str,
        target_number: &str,
        amount: Amount,
    ) -> Result<(Account, Account)> {
        validate_operation_amount(amount)?;
        if target_number == account_number {
            return Err(ValidationError::SelfTransfer.into());
        }

        let mut accounts = self.store.load_accounts()?;
        let source_idx = position_active(&accounts, account_number).ok_or(AuthError::NotFound)?;
        let target_idx = position_active(&accounts, target_number)
            .ok_or_else(|| TellerError::AccountNotFound(target_number.to_string()))?;

        if !accounts[source_idx].debit(amount) {
            warn!("Rejected transfer of {amount} from account {account_number}: insufficient funds");
            return Err(TellerError::InsufficientFunds);
        }
        accounts[target_idx].credit(amount);

        self.store.save_accounts(&accounts)?;
        self.store.append_transaction(&TransactionRecord::transfer_debit(
            account_number,
            target_number,
            amount,
        ))?;
        self.store.append_transaction(&TransactionRecord::transfer_credit(
            target_number,
            account_number,
            amount,
        ))?;

        debug!("Transferred {amount} from account {account_number} to {target_number}");
        Ok((accounts[source_idx].clone(), accounts[target_idx].clone()))
    }

    /// Replaces the account's PIN digest.
    ///
    /// The new PIN must be 4 digits and its digest must not already be used
    /// by any other active account. Digests are compared; raw PINs are never
    /// stored or logged.
    pub fn change_pin(&self, account_number: &str, new_pin: &str) -> Result<Account> {
        account::validate_pin(new_pin)?;
        let new_hash = account::hash_pin(new_pin);

        let mut accounts = self.store.load_accounts()?;
        let in_use = accounts.iter().any(|a| {
            a.account_number != account_number && a.is_active() && a.pin_hash == new_hash
        });
        if in_use {
            warn!("Rejected PIN change for account {account_number}: digest already in use");
            return Err(ValidationError::PinNotUnique.into());
        }

        let idx = position_active(&accounts, account_number).ok_or(AuthError::NotFound)?;
        accounts[idx].pin_hash = new_hash;
        self.store.save_accounts(&accounts)?;

        debug!("Changed PIN for account {account_number}");
        Ok(accounts[idx].clone())
    }

    /// Marks an account as deleted without removing its row.
    ///
    /// `confirmed` carries the caller's explicit yes/no answer; the service
    /// never re-prompts. After this, the account is invisible to
    /// [`AccountService::authenticate`] and to transfer-target lookup, but
    /// its transaction history stays readable.
    pub fn soft_delete(&self, account_number: &str, confirmed: bool) -> Result<Account> {
        if !confirmed {
            return Err(ValidationError::NotConfirmed.into());
        }

        let mut accounts = self.store.load_accounts()?;
        let idx = position_active(&accounts, account_number).ok_or(AuthError::NotFound)?;
        accounts[idx].is_deleted = true;
        self.store.save_accounts(&accounts)?;

        debug!("Soft-deleted account {account_number}");
        Ok(accounts[idx].clone())
    }

    /// The account's log rows in chronological order.
    ///
    /// Deliberately skips the active-account check: history remains
    /// retrievable for soft-deleted accounts.
    pub fn transaction_history(&self, account_number: &str) -> Result<Vec<TransactionRecord>> {
        Ok(self.store.load_transactions(account_number)?)
    }
}

/// Amount rule shared by deposit, withdraw and transfer: strictly positive
/// and at most 10000.00. Format (two decimals, non-negative) is enforced
/// when the `Amount` is parsed.
fn validate_operation_amount(amount: Amount) -> Result<()> {
    if amount.is_zero() {
        return Err(ValidationError::NonPositiveAmount.into());
    }
    if amount > Amount::operation_limit() {
        return Err(ValidationError::AmountTooLarge.into());
    }
    Ok(())
}

fn find_active<'a>(accounts: &'a [Account], account_number: &str) -> Option<&'a Account> {
    accounts
        .iter()
        .find(|a| a.account_number == account_number && a.is_active())
}

fn position_active(accounts: &[Account], account_number: &str) -> Option<usize> {
    accounts
        .iter()
        .position(|a| a.account_number == account_number && a.is_active())
}
