use std::fmt;
use std::io;

use crate::domain::types::{AccountNumber, Amount, TransactionKind};
use crate::parser::ParseError;

/// Rejections raised by the ledger model and the input checks in front of it.
/// None of them are fatal: the teller reports them and carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InvalidInput(String),
    InvalidTransaction(String),
    InvalidTransactionType(String),
    OverdraftDenied { floor: Amount },
    NotFound(AccountNumber),
    Duplicate(AccountNumber),
    SameAccount,
    NotEnoughAccounts,
}

impl std::error::Error for LedgerError {}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InvalidInput(message) => f.write_str(message),
            LedgerError::InvalidTransaction(message) => {
                write!(f, "Invalid transaction: {}", message)
            }
            LedgerError::InvalidTransactionType(kind) => {
                let names: Vec<_> = TransactionKind::ALL.iter().map(|k| k.as_str()).collect();
                write!(
                    f,
                    "Invalid transaction type '{}'. Must be one of: {}",
                    kind,
                    names.join(", ")
                )
            }
            LedgerError::OverdraftDenied { floor } => write!(
                f,
                "Transaction denied. Cannot exceed overdraft limit of {}",
                floor.dollars()
            ),
            LedgerError::NotFound(number) => write!(f, "Account {} not found", number),
            LedgerError::Duplicate(number) => write!(f, "Account {} already exists", number),
            LedgerError::SameAccount => f.write_str("Cannot transfer to the same account"),
            LedgerError::NotEnoughAccounts => {
                f.write_str("Need at least two accounts to transfer money")
            }
        }
    }
}

/// Failures reading or writing the persisted ledger.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Csv(csv::Error),
    Parse(ParseError),
    UnsupportedVersion(String),
    BalanceMismatch {
        account: AccountNumber,
        stored: Amount,
        computed: Amount,
    },
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Csv(e) => write!(f, "CSV error: {}", e),
            StoreError::Parse(e) => write!(f, "{}", e),
            StoreError::UnsupportedVersion(version) => {
                write!(f, "Unsupported ledger file version: '{}'", version)
            }
            StoreError::BalanceMismatch {
                account,
                stored,
                computed,
            } => write!(
                f,
                "Account {} stores balance {} but its history sums to {}",
                account, stored, computed
            ),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Csv(e)
    }
}

impl From<ParseError> for StoreError {
    fn from(e: ParseError) -> Self {
        StoreError::Parse(e)
    }
}
