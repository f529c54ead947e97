use serde::Serialize;
use std::io::Write;

use crate::domain::{Account, Ledger, Transaction};
use crate::parser::{FORMAT_VERSION, STORED_TIMESTAMP_FORMAT};

/// One output row. Field order is the column order of the file.
#[derive(Debug, Serialize)]
pub struct StoreRow<'a> {
    pub record: &'static str,
    pub key: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub kind: Option<&'static str>,
    pub amount: Option<String>,
    pub timestamp: Option<String>,
}

impl<'a> StoreRow<'a> {
    pub fn version() -> Self {
        StoreRow {
            record: "version",
            key: FORMAT_VERSION,
            first_name: None,
            last_name: None,
            kind: None,
            amount: None,
            timestamp: None,
        }
    }

    pub fn from_account(account: &'a Account) -> Self {
        StoreRow {
            record: "account",
            key: account.number().as_str(),
            first_name: Some(account.first_name()),
            last_name: Some(account.last_name()),
            kind: None,
            amount: Some(account.balance().to_string()),
            timestamp: None,
        }
    }

    pub fn from_transaction(account: &'a Account, tx: &Transaction) -> Self {
        StoreRow {
            record: "transaction",
            key: account.number().as_str(),
            first_name: None,
            last_name: None,
            kind: Some(tx.kind().as_str()),
            amount: Some(tx.amount().to_string()),
            timestamp: Some(tx.timestamp().format(STORED_TIMESTAMP_FORMAT).to_string()),
        }
    }
}

/// Writes the whole ledger: the version row, then each account followed by
/// its history in chronological order.
pub fn write_ledger<W: Write>(writer: W, ledger: &Ledger) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.serialize(StoreRow::version())?;
    for account in ledger.accounts().values() {
        csv_writer.serialize(StoreRow::from_account(account))?;
        for tx in account.transaction_history() {
            csv_writer.serialize(StoreRow::from_transaction(account, tx))?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
