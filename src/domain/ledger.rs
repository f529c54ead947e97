use chrono::Local;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::domain::account::Account;
use crate::domain::transaction::Transaction;
use crate::domain::types::{AccountNumber, Amount, TransactionKind};
use crate::error::LedgerError;

/// Lowest balance a debit may leave behind unless configured otherwise.
pub const DEFAULT_OVERDRAFT_FLOOR: Amount = Amount(Decimal::from_parts(500, 0, 0, true, 0));

/// Moves `amount` from `sender` to `receiver` when the sender can cover it.
///
/// Both transactions are validated before either account changes, so a
/// rejected transfer leaves both accounts untouched.
pub fn transfer(
    sender: &mut Account,
    receiver: &mut Account,
    amount: Amount,
    floor: Amount,
) -> Result<(), LedgerError> {
    if !sender.can_withdraw(amount, floor) {
        return Err(LedgerError::OverdraftDenied { floor });
    }
    if !receiver.can_credit(amount) {
        return Err(LedgerError::InvalidTransaction(
            "recipient balance would overflow".to_string(),
        ));
    }

    let timestamp = Local::now().naive_local();
    let debit = Transaction::new(TransactionKind::TransferOut, amount, Some(timestamp))?;
    let credit = Transaction::new(TransactionKind::TransferIn, amount, Some(timestamp))?;

    sender.apply(debit)?;
    receiver.apply(credit)?;
    Ok(())
}

/// All accounts, keyed by number, plus the overdraft floor debits are held to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    accounts: BTreeMap<AccountNumber, Account>,
    overdraft_floor: Amount,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_overdraft_floor(DEFAULT_OVERDRAFT_FLOOR)
    }

    pub fn with_overdraft_floor(overdraft_floor: Amount) -> Self {
        Ledger {
            accounts: BTreeMap::new(),
            overdraft_floor,
        }
    }

    pub fn overdraft_floor(&self) -> Amount {
        self.overdraft_floor
    }

    pub fn accounts(&self) -> &BTreeMap<AccountNumber, Account> {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, number: &AccountNumber) -> bool {
        self.accounts.contains_key(number)
    }

    pub fn get(&self, number: &AccountNumber) -> Result<&Account, LedgerError> {
        self.accounts
            .get(number)
            .ok_or_else(|| LedgerError::NotFound(number.clone()))
    }

    pub fn get_mut(&mut self, number: &AccountNumber) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(number)
            .ok_or_else(|| LedgerError::NotFound(number.clone()))
    }

    /// Adds an already built account, refusing to replace an existing one.
    pub fn insert(&mut self, account: Account) -> Result<(), LedgerError> {
        if self.contains(account.number()) {
            return Err(LedgerError::Duplicate(account.number().clone()));
        }
        self.accounts.insert(account.number().clone(), account);
        Ok(())
    }

    pub fn open_account(
        &mut self,
        first_name: &str,
        last_name: &str,
        number: AccountNumber,
        initial_deposit: Amount,
    ) -> Result<&Account, LedgerError> {
        if self.contains(&number) {
            return Err(LedgerError::Duplicate(number));
        }
        let account = Account::open(first_name, last_name, number.clone(), initial_deposit)?;
        self.accounts.insert(number.clone(), account);
        self.get(&number)
    }

    /// Returns the new balance.
    pub fn deposit(&mut self, number: &AccountNumber, amount: Amount) -> Result<Amount, LedgerError> {
        let account = self.get_mut(number)?;
        account.deposit(amount)?;
        Ok(account.balance())
    }

    /// Returns the new balance.
    pub fn withdraw(&mut self, number: &AccountNumber, amount: Amount) -> Result<Amount, LedgerError> {
        let floor = self.overdraft_floor;
        let account = self.get_mut(number)?;
        account.withdraw(amount, floor)?;
        Ok(account.balance())
    }

    pub fn transfer(
        &mut self,
        from: &AccountNumber,
        to: &AccountNumber,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::SameAccount);
        }
        if !self.contains(to) {
            return Err(LedgerError::NotFound(to.clone()));
        }

        let mut sender = self
            .accounts
            .remove(from)
            .ok_or_else(|| LedgerError::NotFound(from.clone()))?;
        let result = match self.accounts.get_mut(to) {
            Some(receiver) => transfer(&mut sender, receiver, amount, self.overdraft_floor),
            None => Err(LedgerError::NotFound(to.clone())),
        };
        self.accounts.insert(from.clone(), sender);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::from_str_rounded(s).expect("failed to parse amount")
    }

    fn number(s: &str) -> AccountNumber {
        s.parse().expect("valid account number")
    }

    fn ledger_with(accounts: &[(&str, &str)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (n, opening) in accounts {
            ledger
                .open_account("First", "Last", number(n), amount(opening))
                .expect("account opens");
        }
        ledger
    }

    #[test]
    fn test_default_floor() {
        assert_eq!(Ledger::new().overdraft_floor(), amount("-500"));
    }

    #[test]
    fn test_open_account() {
        let ledger = ledger_with(&[("12345", "500")]);
        let account = ledger.get(&number("12345")).expect("account exists");
        assert_eq!(account.balance(), amount("500"));
        assert_eq!(account.transaction_history().len(), 1);
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut ledger = ledger_with(&[("12345", "500")]);
        let result = ledger.open_account("Other", "Person", number("12345"), amount("1"));
        assert_eq!(result.unwrap_err(), LedgerError::Duplicate(number("12345")));
        assert_eq!(
            ledger.get(&number("12345")).expect("exists").first_name(),
            "First"
        );
    }

    #[test]
    fn test_unknown_account_not_found() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.deposit(&number("99999"), amount("1")),
            Err(LedgerError::NotFound(number("99999")))
        );
    }

    #[test]
    fn test_withdraw_respects_floor() {
        let mut ledger = ledger_with(&[("12345", "500")]);
        let acct = number("12345");

        assert!(ledger.withdraw(&acct, amount("900")).is_ok());
        assert_eq!(ledger.get(&acct).expect("exists").balance(), amount("-400"));

        let result = ledger.withdraw(&acct, amount("100.01"));
        assert!(matches!(result, Err(LedgerError::OverdraftDenied { .. })));
        assert_eq!(ledger.get(&acct).expect("exists").balance(), amount("-400"));
    }

    #[test]
    fn test_custom_floor() {
        let mut ledger = Ledger::with_overdraft_floor(Amount::ZERO);
        ledger
            .open_account("A", "B", number("00001"), amount("10"))
            .expect("opens");
        assert!(ledger.withdraw(&number("00001"), amount("10.01")).is_err());
        assert_eq!(ledger.withdraw(&number("00001"), amount("10")), Ok(Amount::ZERO));
    }

    #[test]
    fn test_transfer_moves_funds() {
        let mut ledger = ledger_with(&[("11111", "300"), ("22222", "100")]);
        ledger
            .transfer(&number("11111"), &number("22222"), amount("200"))
            .expect("transfer admitted");

        let sender = ledger.get(&number("11111")).expect("exists");
        let receiver = ledger.get(&number("22222")).expect("exists");
        assert_eq!(sender.balance(), amount("100"));
        assert_eq!(receiver.balance(), amount("300"));
        assert_eq!(
            sender.transaction_history().last().map(|tx| tx.kind()),
            Some(TransactionKind::TransferOut)
        );
        assert_eq!(
            receiver.transaction_history().last().map(|tx| tx.kind()),
            Some(TransactionKind::TransferIn)
        );
    }

    #[test]
    fn test_denied_transfer_changes_nothing() {
        let mut ledger = ledger_with(&[("11111", "300"), ("22222", "100")]);
        let before = ledger.clone();
        let result = ledger.transfer(&number("11111"), &number("22222"), amount("900"));
        assert!(matches!(result, Err(LedgerError::OverdraftDenied { .. })));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_transfer_to_self_rejected() {
        let mut ledger = ledger_with(&[("11111", "300")]);
        assert_eq!(
            ledger.transfer(&number("11111"), &number("11111"), amount("1")),
            Err(LedgerError::SameAccount)
        );
    }

    #[test]
    fn test_transfer_to_missing_recipient_keeps_sender() {
        let mut ledger = ledger_with(&[("11111", "300")]);
        assert_eq!(
            ledger.transfer(&number("11111"), &number("22222"), amount("1")),
            Err(LedgerError::NotFound(number("22222")))
        );
        assert_eq!(
            ledger.get(&number("11111")).expect("still present").balance(),
            amount("300")
        );
    }

    #[test]
    fn test_transfer_zero_rejected_without_partial_effect() {
        let mut ledger = ledger_with(&[("11111", "300"), ("22222", "100")]);
        let before = ledger.clone();
        let result = ledger.transfer(&number("11111"), &number("22222"), Amount::ZERO);
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_free_transfer_function() {
        let mut sender = Account::open("Bob", "Jones", number("11111"), amount("300"))
            .expect("opens");
        let mut receiver = Account::open("Carol", "Lee", number("22222"), amount("100"))
            .expect("opens");
        transfer(&mut sender, &mut receiver, amount("800"), DEFAULT_OVERDRAFT_FLOOR)
            .expect("exactly to the floor");
        assert_eq!(sender.balance(), amount("-500"));
        assert_eq!(receiver.balance(), amount("900"));
    }

    #[test]
    fn test_oversized_deposits_rejected_without_effect() {
        let mut ledger = ledger_with(&[("12345", "100")]);
        let acct = number("12345");
        let huge = Amount(Decimal::MAX);

        for _ in 0..2 {
            assert!(matches!(
                ledger.deposit(&acct, huge),
                Err(LedgerError::InvalidTransaction(_))
            ));
        }
        assert!(ledger.withdraw(&acct, huge).is_err());
        let account = ledger.get(&acct).expect("exists");
        assert_eq!(account.balance(), amount("100"));
        assert_eq!(account.transaction_history().len(), 1);
    }
}
