//! Interactive menu shell.
//!
//! Thin glue between stdin/stdout and the account service: prompts, parses
//! raw text into typed arguments, renders every service error as a message
//! and returns to the menu. No business rules live here.

use crate::account::Account;
use crate::amount::Amount;
use crate::error::{AuthError, TellerError};
use crate::service::AccountService;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

const MAX_PIN_ATTEMPTS: usize = 3;

/// Outcome of one login round.
enum Login {
    Session(Account),
    Retry,
    Exit,
}

/// The menu loop over generic input/output, so tests can drive it with
/// buffers instead of a terminal.
pub struct Shell<'a, R, W> {
    service: &'a AccountService,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(service: &'a AccountService, input: R, out: W) -> Self {
        Shell {
            service,
            input,
            out,
        }
    }

    /// Runs login rounds until a session starts or input ends, then the menu.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            match self.login()? {
                Login::Session(account) => {
                    self.main_menu(account)?;
                    return Ok(());
                }
                Login::Retry => continue,
                Login::Exit => return Ok(()),
            }
        }
    }

    /// Writes a prompt and reads one trimmed line. `None` means end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.out, "{message}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn login(&mut self) -> io::Result<Login> {
        writeln!(self.out, "\n--- Login ---")?;
        let number = match self.prompt("Enter account number: ")? {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(Login::Exit),
        };

        for attempt in 0..MAX_PIN_ATTEMPTS {
            let pin = match self.prompt("Enter 4-digit PIN: ")? {
                Some(pin) => pin,
                None => return Ok(Login::Exit),
            };
            match self.service.authenticate(&number, &pin) {
                Ok(account) => {
                    writeln!(self.out, "Login successful. Welcome, {}.", account.name)?;
                    return Ok(Login::Session(account));
                }
                Err(TellerError::Auth(AuthError::NotFound)) => {
                    writeln!(self.out, "Account not found.")?;
                    return Ok(Login::Retry);
                }
                Err(TellerError::Auth(AuthError::BadPin)) => {
                    writeln!(
                        self.out,
                        "Incorrect PIN. {} attempts left.",
                        MAX_PIN_ATTEMPTS - 1 - attempt
                    )?;
                }
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
        writeln!(self.out, "Too many attempts.")?;
        Ok(Login::Retry)
    }

    fn main_menu(&mut self, mut account: Account) -> io::Result<()> {
        loop {
            writeln!(self.out, "\n--- ATM Menu ---")?;
            writeln!(self.out, "1. Check Balance")?;
            writeln!(self.out, "2. Deposit Funds")?;
            writeln!(self.out, "3. Withdraw Funds")?;
            writeln!(self.out, "4. Transfer Funds")?;
            writeln!(self.out, "5. Change PIN")?;
            writeln!(self.out, "6. View Transactions")?;
            writeln!(self.out, "7. Delete Account")?;
            writeln!(self.out, "8. Exit")?;

            let choice = match self.prompt("Choose (1-8): ")? {
                Some(choice) => choice,
                None => return Ok(()),
            };

            match choice.as_str() {
                "1" => self.check_balance(&account)?,
                "2" => {
                    if let Some(updated) = self.deposit(&account)? {
                        account = updated;
                    }
                }
                "3" => {
                    if let Some(updated) = self.withdraw(&account)? {
                        account = updated;
                    }
                }
                "4" => {
                    if let Some(updated) = self.transfer(&account)? {
                        account = updated;
                    }
                }
                "5" => self.change_pin(&account)?,
                "6" => self.view_transactions(&account)?,
                "7" => {
                    if self.delete_account(&account)? {
                        return Ok(());
                    }
                }
                "8" => {
                    writeln!(self.out, "Thank you for using the ATM.")?;
                    return Ok(());
                }
                _ => writeln!(self.out, "Invalid option.")?,
            }
        }
    }

    fn check_balance(&mut self, account: &Account) -> io::Result<()> {
        match self.service.check_balance(&account.account_number) {
            Ok(balance) => writeln!(self.out, "Current balance: {balance}"),
            Err(e) => writeln!(self.out, "{e}"),
        }
    }

    /// Prompts for an amount; `None` on cancel (empty line) or bad format.
    fn prompt_amount(&mut self, message: &str) -> io::Result<Option<Amount>> {
        let raw = match self.prompt(message)? {
            Some(s) if !s.is_empty() => s,
            _ => {
                writeln!(self.out, "Cancelled.")?;
                return Ok(None);
            }
        };
        match Amount::from_str(&raw) {
            Ok(amount) => Ok(Some(amount)),
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(None)
            }
        }
    }

    fn deposit(&mut self, account: &Account) -> io::Result<Option<Account>> {
        let amount = match self.prompt_amount("Enter amount to deposit: ")? {
            Some(amount) => amount,
            None => return Ok(None),
        };
        match self.service.deposit(&account.account_number, amount) {
            Ok(updated) => {
                writeln!(self.out, "Deposited {amount}")?;
                Ok(Some(updated))
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(None)
            }
        }
    }

    fn withdraw(&mut self, account: &Account) -> io::Result<Option<Account>> {
        let amount = match self.prompt_amount("Enter amount to withdraw: ")? {
            Some(amount) => amount,
            None => return Ok(None),
        };
        match self.service.withdraw(&account.account_number, amount) {
            Ok(updated) => {
                writeln!(self.out, "Withdrawn {amount}")?;
                Ok(Some(updated))
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(None)
            }
        }
    }

    fn transfer(&mut self, account: &Account) -> io::Result<Option<Account>> {
        let target = match self.prompt("Enter target account number: ")? {
            Some(s) if !s.is_empty() => s,
            _ => {
                writeln!(self.out, "Cancelled.")?;
                return Ok(None);
            }
        };
        let amount = match self.prompt_amount("Enter amount to transfer: ")? {
            Some(amount) => amount,
            None => return Ok(None),
        };
        match self
            .service
            .transfer(&account.account_number, &target, amount)
        {
            Ok((updated, _)) => {
                writeln!(self.out, "Transferred {amount} to account {target}")?;
                Ok(Some(updated))
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(None)
            }
        }
    }

    fn change_pin(&mut self, account: &Account) -> io::Result<()> {
        let new_pin = match self.prompt("Enter new 4-digit PIN: ")? {
            Some(s) if !s.is_empty() => s,
            _ => {
                writeln!(self.out, "Cancelled.")?;
                return Ok(());
            }
        };
        let confirm = match self.prompt("Confirm new PIN: ")? {
            Some(pin) => pin,
            None => return Ok(()),
        };
        if new_pin != confirm {
            writeln!(self.out, "PINs do not match.")?;
            return Ok(());
        }
        match self.service.change_pin(&account.account_number, &new_pin) {
            Ok(_) => writeln!(self.out, "PIN changed successfully."),
            Err(e) => writeln!(self.out, "{e}"),
        }
    }

    fn view_transactions(&mut self, account: &Account) -> io::Result<()> {
        writeln!(self.out, "\n--- Transaction History ---")?;
        let history = match self.service.transaction_history(&account.account_number) {
            Ok(history) => history,
            Err(e) => return writeln!(self.out, "{e}"),
        };
        if history.is_empty() {
            return writeln!(self.out, "No transactions found.");
        }
        for record in history {
            let counterparty = record.counterparty_account.as_deref().unwrap_or("-");
            writeln!(
                self.out,
                "{} | {:?} | {} | {} | {:?}",
                record.timestamp.format(crate::transaction::TIMESTAMP_FORMAT),
                record.kind,
                record.amount,
                counterparty,
                record.direction
            )?;
        }
        Ok(())
    }

    /// Returns `true` when the account was deleted and the session ends.
    fn delete_account(&mut self, account: &Account) -> io::Result<bool> {
        let answer = self
            .prompt("Are you sure you want to delete your account? (yes/no): ")?
            .unwrap_or_default()
            .to_lowercase();
        let confirmed = answer == "yes";
        match self
            .service
            .soft_delete(&account.account_number, confirmed)
        {
            Ok(_) => {
                writeln!(self.out, "Account deleted. Thank you for using the ATM.")?;
                Ok(true)
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(false)
            }
        }
    }
}
