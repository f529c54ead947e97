use chrono::NaiveDateTime;

use crate::domain::transaction::Transaction;
use crate::domain::types::{AccountNumber, Amount, TransactionKind};
use crate::error::LedgerError;

/// A customer account. The balance is always the signed sum of the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    first_name: String,
    last_name: String,
    number: AccountNumber,
    balance: Amount,
    transactions: Vec<Transaction>,
}

impl Account {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        number: AccountNumber,
    ) -> Self {
        Account {
            first_name: first_name.into(),
            last_name: last_name.into(),
            number,
            balance: Amount::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Opens an account. A positive opening deposit is recorded as the first
    /// transaction; zero opens an empty account.
    pub fn open(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        number: AccountNumber,
        initial_deposit: Amount,
    ) -> Result<Self, LedgerError> {
        if initial_deposit.is_negative() {
            return Err(LedgerError::InvalidInput(
                "Amount must be a positive number".to_string(),
            ));
        }

        let mut account = Self::new(first_name, last_name, number);
        if initial_deposit.is_positive() {
            account.deposit(initial_deposit)?;
        }
        Ok(account)
    }

    /// Rebuilds an account from a persisted history by replaying it in order.
    pub fn restore(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        number: AccountNumber,
        transactions: Vec<Transaction>,
    ) -> Result<Self, LedgerError> {
        let mut account = Self::new(first_name, last_name, number);
        for tx in transactions {
            account.apply(tx)?;
        }
        Ok(account)
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn number(&self) -> &AccountNumber {
        &self.number
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Chronological history, oldest first.
    pub fn transaction_history(&self) -> &[Transaction] {
        &self.transactions
    }

    /// True iff debiting `amount` keeps the balance at or above `floor`.
    /// `amount == 0` asks whether any withdrawal is allowed right now.
    pub fn can_withdraw(&self, amount: Amount, floor: Amount) -> bool {
        self.balance
            .checked_sub(amount)
            .map_or(false, |remaining| remaining >= floor)
    }

    /// Records a transaction and moves the balance with it. Does not check
    /// the overdraft floor; use [`Account::withdraw`] for gated debits.
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        amount: Amount,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<&Transaction, LedgerError> {
        let tx = Transaction::new(kind, amount, timestamp)?;
        self.apply(tx)
    }

    pub fn deposit(&mut self, amount: Amount) -> Result<&Transaction, LedgerError> {
        self.add_transaction(TransactionKind::Deposit, amount, None)
    }

    pub fn withdraw(&mut self, amount: Amount, floor: Amount) -> Result<&Transaction, LedgerError> {
        if !self.can_withdraw(amount, floor) {
            return Err(LedgerError::OverdraftDenied { floor });
        }
        self.add_transaction(TransactionKind::Withdraw, amount, None)
    }

    /// Whether crediting `amount` keeps the balance representable.
    pub fn can_credit(&self, amount: Amount) -> bool {
        self.balance.checked_add(amount).is_some()
    }

    // Appending and rebalancing happen together so no caller sees one
    // without the other.
    pub(crate) fn apply(&mut self, tx: Transaction) -> Result<&Transaction, LedgerError> {
        let balance = self
            .balance
            .checked_add(tx.signed_amount())
            .ok_or_else(|| LedgerError::InvalidTransaction("balance would overflow".to_string()))?;
        self.balance = balance;
        self.transactions.push(tx);
        Ok(&self.transactions[self.transactions.len() - 1])
    }
}
