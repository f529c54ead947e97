use chrono::{Local, NaiveDateTime};
use std::fmt;

use crate::domain::types::{Amount, TransactionKind};
use crate::error::LedgerError;

/// Format used when a transaction is shown to the teller.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One immutable ledger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    kind: TransactionKind,
    amount: Amount,
    timestamp: NaiveDateTime,
}

impl Transaction {
    /// Builds a transaction, stamping it with the local time when no
    /// timestamp is given. The amount must be strictly positive, in whole
    /// cents and no larger than [`Amount::MAX`].
    pub fn new(
        kind: TransactionKind,
        amount: Amount,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidTransaction(
                "amount must be greater than zero".to_string(),
            ));
        }
        if !amount.is_whole_cents() {
            return Err(LedgerError::InvalidTransaction(
                "amount cannot have more than two decimal places".to_string(),
            ));
        }
        if !amount.within_limit() {
            return Err(LedgerError::InvalidTransaction(format!(
                "amount cannot exceed {}",
                Amount::MAX.dollars()
            )));
        }

        Ok(Transaction {
            kind,
            amount,
            timestamp: timestamp.unwrap_or_else(|| Local::now().naive_local()),
        })
    }

    /// Builds a transaction from raw text fields.
    pub fn parse(
        kind: &str,
        amount: &str,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<Self, LedgerError> {
        let kind: TransactionKind = kind.parse()?;
        let amount = Amount::parse_exact(amount).map_err(|e| {
            LedgerError::InvalidTransaction(format!("amount '{}': {}", amount.trim(), e))
        })?;
        Self::new(kind, amount, timestamp)
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Effect on the owning account's balance.
    pub fn signed_amount(&self) -> Amount {
        if self.kind.is_credit() {
            self.amount
        } else {
            Amount::ZERO - self.amount
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | ${}",
            self.timestamp.format(DISPLAY_TIMESTAMP_FORMAT),
            self.kind.title(),
            self.amount
        )
    }
}
