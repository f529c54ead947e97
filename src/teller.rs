use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::domain::types::{AccountNumber, Amount};
use crate::domain::{Account, Ledger};
use crate::error::LedgerError;

const SYSTEM_MENU: [&str; 4] = [
    "1. Access Existing Account",
    "2. Create New Account",
    "3. View All Accounts",
    "4. Exit System",
];

const ACCOUNT_MENU: [&str; 6] = [
    "1. Deposit Money",
    "2. Withdraw Money",
    "3. Transfer Between Existing Accounts",
    "4. View Transaction History",
    "5. View Account Balance",
    "6. Return to System Menu",
];

/// Whether the operator can still be prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Open,
    Closed,
}

/// Menu-driven teller session over an owned ledger.
///
/// Input is read line by line; end of input ends the session the same way
/// choosing "Exit System" does. Every rejection is reported as a warning and
/// the operator is returned to the current menu.
pub struct Teller<R, W> {
    ledger: Ledger,
    input: R,
    output: W,
    color: bool,
}

impl<R: BufRead, W: Write> Teller<R, W> {
    pub fn new(ledger: Ledger, input: R, output: W) -> Self {
        Teller {
            ledger,
            input,
            output,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.info("Welcome to the Bank Teller System")?;

        loop {
            self.info("")?;
            self.info("System Menu")?;
            for line in SYSTEM_MENU {
                self.info(line)?;
            }

            let choice = match self.prompt("Select an option (1-4): ")? {
                Some(choice) => choice,
                None => break,
            };

            let session = match choice.as_str() {
                "1" => self.access_account()?,
                "2" => self.create_account()?,
                "3" => {
                    self.list_accounts()?;
                    Session::Open
                }
                "4" => break,
                _ => {
                    self.warn("Invalid option. Please choose between 1 and 4")?;
                    Session::Open
                }
            };

            if session == Session::Closed {
                break;
            }
        }

        self.info("Exiting Bank Teller System.")
    }

    fn access_account(&mut self) -> io::Result<Session> {
        let raw = match self.prompt("Enter account number: ")? {
            Some(raw) => raw,
            None => return Ok(Session::Closed),
        };

        let number = match raw.parse::<AccountNumber>() {
            Ok(number) => number,
            Err(e) => {
                self.warn(&e.to_string())?;
                return Ok(Session::Open);
            }
        };

        if let Err(e) = self.ledger.get(&number) {
            self.warn(&e.to_string())?;
            return Ok(Session::Open);
        }

        self.account_menu(&number)
    }

    fn create_account(&mut self) -> io::Result<Session> {
        let first_name = match self.prompt_name("Enter customer's first name: ")? {
            Some(name) => name,
            None => return Ok(Session::Closed),
        };
        let last_name = match self.prompt_name("Enter customer's last name: ")? {
            Some(name) => name,
            None => return Ok(Session::Closed),
        };
        let raw = match self.prompt("Enter 5-digit account number: ")? {
            Some(raw) => raw,
            None => return Ok(Session::Closed),
        };

        let number = match raw.parse::<AccountNumber>() {
            Ok(number) => number,
            Err(e) => {
                self.warn(&e.to_string())?;
                return Ok(Session::Open);
            }
        };

        if self.ledger.contains(&number) {
            self.warn(&LedgerError::Duplicate(number).to_string())?;
            return Ok(Session::Open);
        }

        let initial_deposit = match self.prompt_amount("Enter initial deposit amount: ", true)? {
            Some(amount) => amount,
            None => return Ok(Session::Closed),
        };

        if let Err(e) =
            self.ledger
                .open_account(&first_name, &last_name, number.clone(), initial_deposit)
        {
            self.warn(&e.to_string())?;
            return Ok(Session::Open);
        }

        self.info("Account created")?;
        self.account_menu(&number)
    }

    fn list_accounts(&mut self) -> io::Result<()> {
        if self.ledger.is_empty() {
            return self.info("No accounts in the system");
        }

        let lines: Vec<String> = self
            .ledger
            .accounts()
            .values()
            .flat_map(describe_account)
            .collect();
        for line in lines {
            self.info(&line)?;
        }
        Ok(())
    }

    fn account_menu(&mut self, number: &AccountNumber) -> io::Result<Session> {
        loop {
            let (header, can_withdraw) = match self.ledger.get(number) {
                Ok(account) => (
                    format!(
                        "Account Menu for {} {} (Acct #{})",
                        account.first_name(),
                        account.last_name(),
                        account.number()
                    ),
                    account.can_withdraw(Amount::ZERO, self.ledger.overdraft_floor()),
                ),
                Err(e) => {
                    self.warn(&e.to_string())?;
                    return Ok(Session::Open);
                }
            };

            self.info("")?;
            self.info(&header)?;
            for line in ACCOUNT_MENU {
                self.info(line)?;
            }

            let choice = match self.prompt("Select an option (1-6): ")? {
                Some(choice) => choice,
                None => return Ok(Session::Closed),
            };

            if !can_withdraw && choice == "2" {
                self.warn("Withdrawals disabled due to overdraft limit.")?;
                continue;
            }

            match choice.as_str() {
                "1" => {
                    let amount = match self.prompt_amount("Enter deposit amount: ", false)? {
                        Some(amount) => amount,
                        None => return Ok(Session::Closed),
                    };
                    match self.ledger.deposit(number, amount) {
                        Ok(balance) => self.info(&format!(
                            "Deposited {}. New balance: {}",
                            amount.dollars(),
                            balance.dollars()
                        ))?,
                        Err(e) => self.warn(&e.to_string())?,
                    }
                }
                "2" => {
                    let amount = match self.prompt_amount("Enter withdrawal amount: ", false)? {
                        Some(amount) => amount,
                        None => return Ok(Session::Closed),
                    };
                    match self.ledger.withdraw(number, amount) {
                        Ok(balance) => self.info(&format!(
                            "Withdrew {}. New balance: {}",
                            amount.dollars(),
                            balance.dollars()
                        ))?,
                        Err(e) => self.warn(&e.to_string())?,
                    }
                }
                "3" => {
                    if self.transfer_from(number)? == Session::Closed {
                        return Ok(Session::Closed);
                    }
                }
                "4" => {
                    let lines: Vec<String> = self
                        .ledger
                        .get(number)
                        .map(|account| {
                            account
                                .transaction_history()
                                .iter()
                                .map(|tx| tx.to_string())
                                .collect()
                        })
                        .unwrap_or_default();
                    if lines.is_empty() {
                        self.info("No transactions available")?;
                    }
                    for line in lines {
                        self.info(&line)?;
                    }
                }
                "5" => {
                    if let Ok(account) = self.ledger.get(number) {
                        let line = format!("Current balance: {}", account.balance().dollars());
                        self.info(&line)?;
                    }
                }
                "6" => {
                    self.info("Returning to System Menu")?;
                    return Ok(Session::Open);
                }
                _ => self.warn("Invalid option, please choose between 1 and 6")?,
            }
        }
    }

    fn transfer_from(&mut self, sender: &AccountNumber) -> io::Result<Session> {
        if self.ledger.len() < 2 {
            self.warn(&LedgerError::NotEnoughAccounts.to_string())?;
            return Ok(Session::Open);
        }

        let raw = match self.prompt("Enter recipient's 5-digit account number: ")? {
            Some(raw) => raw,
            None => return Ok(Session::Closed),
        };

        let receiver = match raw.parse::<AccountNumber>() {
            Ok(number) if self.ledger.contains(&number) => number,
            Ok(number) => {
                self.warn(&LedgerError::NotFound(number).to_string())?;
                return Ok(Session::Open);
            }
            Err(e) => {
                self.warn(&e.to_string())?;
                return Ok(Session::Open);
            }
        };

        if &receiver == sender {
            self.warn(&LedgerError::SameAccount.to_string())?;
            return Ok(Session::Open);
        }

        let amount = match self.prompt_amount("Enter amount to transfer: ", false)? {
            Some(amount) => amount,
            None => return Ok(Session::Closed),
        };

        match self.ledger.transfer(sender, &receiver, amount) {
            Ok(()) => self.info(&format!(
                "Transferred {} to Acct #{}",
                amount.dollars(),
                receiver
            ))?,
            Err(e) => self.warn(&e.to_string())?,
        }
        Ok(Session::Open)
    }

    /// Reads one trimmed line, or `None` once input is exhausted.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_name(&mut self, text: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(text)? {
                Some(name) if name.is_empty() => self.warn("Name cannot be blank")?,
                other => return Ok(other),
            }
        }
    }

    fn prompt_amount(&mut self, text: &str, allow_zero: bool) -> io::Result<Option<Amount>> {
        loop {
            let raw = match self.prompt(text)? {
                Some(raw) => raw,
                None => return Ok(None),
            };
            match Amount::parse_entry(&raw, allow_zero) {
                Ok(amount) => return Ok(Some(amount)),
                Err(e) => self.warn(&e.to_string())?,
            }
        }
    }

    fn info(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    fn warn(&mut self, message: &str) -> io::Result<()> {
        let line = format!("Warning: {}", message);
        if self.color {
            writeln!(self.output, "{}", line.yellow())
        } else {
            writeln!(self.output, "{}", line)
        }
    }
}

/// Summary line plus history, as shown by "View All Accounts".
pub fn describe_account(account: &Account) -> Vec<String> {
    let mut lines = vec![format!(
        "Acct #{} | {} | {} | Balance: {}",
        account.number(),
        account.first_name(),
        account.last_name(),
        account.balance().dollars()
    )];

    let history = account.transaction_history();
    if history.is_empty() {
        lines.push("  No transactions recorded".to_string());
    } else {
        lines.push("  Transactions:".to_string());
        lines.extend(history.iter().map(|tx| format!("     {}", tx)));
    }
    lines
}
