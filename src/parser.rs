use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::io::Read;

use crate::domain::types::{AccountNumber, Amount};
use crate::domain::{Account, Ledger, Transaction};
use crate::error::StoreError;

/// Ledger file format this build reads and writes.
pub const FORMAT_VERSION: &str = "1";

/// Timestamp layout on disk; sub-second digits are kept when present.
pub const STORED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One row of the ledger file.
#[derive(Debug)]
pub enum StoreRecord {
    Version(String),
    Account {
        number: AccountNumber,
        first_name: String,
        last_name: String,
        balance: Amount,
    },
    Transaction {
        number: AccountNumber,
        transaction: Transaction,
    },
}

#[derive(Debug)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

#[derive(Debug)]
struct ColumnIndices {
    record_idx: usize,
    key_idx: usize,
    first_name_idx: usize,
    last_name_idx: usize,
    kind_idx: usize,
    amount_idx: usize,
    timestamp_idx: usize,
}

pub struct LedgerFileParser<R: Read> {
    reader: csv::Reader<R>,
    line_number: usize,
    columns: ColumnIndices,
}

impl<R: Read> std::fmt::Debug for LedgerFileParser<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerFileParser")
            .field("line_number", &self.line_number)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl<R: Read> LedgerFileParser<R> {
    pub fn new(reader: R) -> Result<Self, ParseError> {
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ParseError {
                line: 1,
                message: format!("Failed to read headers: {}", e),
            })?
            .clone();

        let columns = Self::extract_column_indices(&headers).map_err(|message| ParseError {
            line: 1,
            message,
        })?;

        Ok(LedgerFileParser {
            reader: csv_reader,
            line_number: 1,
            columns,
        })
    }

    fn extract_column_indices(headers: &csv::StringRecord) -> Result<ColumnIndices, String> {
        let find_col = |name: &str| -> Result<usize, String> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| format!("Missing required column: '{}'", name))
        };

        Ok(ColumnIndices {
            record_idx: find_col("record")?,
            key_idx: find_col("key")?,
            first_name_idx: find_col("first_name")?,
            last_name_idx: find_col("last_name")?,
            kind_idx: find_col("kind")?,
            amount_idx: find_col("amount")?,
            timestamp_idx: find_col("timestamp")?,
        })
    }

    pub fn next_record(&mut self) -> Option<Result<StoreRecord, ParseError>> {
        let mut record = csv::StringRecord::new();

        self.line_number += 1;
        let current_line = self.line_number;

        match self.reader.read_record(&mut record) {
            Ok(true) => Some(self.parse_record(&record, current_line)),
            Ok(false) => None,
            Err(e) => Some(Err(ParseError {
                line: current_line,
                message: format!("CSV error: {}", e),
            })),
        }
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        line: usize,
    ) -> Result<StoreRecord, ParseError> {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let fail = |message: String| ParseError { line, message };

        let key = field(self.columns.key_idx).trim();
        let record_type = field(self.columns.record_idx).trim();

        match record_type {
            "version" => Ok(StoreRecord::Version(key.to_string())),
            "account" => {
                let number: AccountNumber = key
                    .parse()
                    .map_err(|_| fail(format!("Invalid account number: '{}'", key)))?;
                let amount_str = field(self.columns.amount_idx).trim();
                let balance = Amount::parse_exact(amount_str)
                    .map_err(|e| fail(format!("Invalid balance '{}': {}", amount_str, e)))?;
                Ok(StoreRecord::Account {
                    number,
                    first_name: field(self.columns.first_name_idx).to_string(),
                    last_name: field(self.columns.last_name_idx).to_string(),
                    balance,
                })
            }
            "transaction" => {
                let number: AccountNumber = key
                    .parse()
                    .map_err(|_| fail(format!("Invalid account number: '{}'", key)))?;
                let timestamp_str = field(self.columns.timestamp_idx).trim();
                let timestamp =
                    NaiveDateTime::parse_from_str(timestamp_str, STORED_TIMESTAMP_FORMAT)
                        .map_err(|_| fail(format!("Invalid timestamp: '{}'", timestamp_str)))?;
                let transaction = Transaction::parse(
                    field(self.columns.kind_idx),
                    field(self.columns.amount_idx),
                    Some(timestamp),
                )
                .map_err(|e| fail(e.to_string()))?;
                Ok(StoreRecord::Transaction {
                    number,
                    transaction,
                })
            }
            other => Err(fail(format!("Unknown record type: '{}'", other))),
        }
    }
}

impl<R: Read> Iterator for LedgerFileParser<R> {
    type Item = Result<StoreRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

struct PendingAccount {
    line: usize,
    first_name: String,
    last_name: String,
    balance: Amount,
    transactions: Vec<Transaction>,
}

/// Reads a whole ledger file. Every account's balance is recomputed from its
/// history and must agree with the stored one.
pub fn read_ledger<R: Read>(reader: R, overdraft_floor: Amount) -> Result<Ledger, StoreError> {
    let mut parser = LedgerFileParser::new(reader)?;

    match parser.next_record() {
        Some(Ok(StoreRecord::Version(version))) if version == FORMAT_VERSION => {}
        Some(Ok(StoreRecord::Version(version))) => {
            return Err(StoreError::UnsupportedVersion(version))
        }
        Some(Ok(_)) | None => {
            return Err(ParseError {
                line: parser.line_number,
                message: "Missing version record".to_string(),
            }
            .into())
        }
        Some(Err(e)) => return Err(e.into()),
    }

    let mut pending: BTreeMap<AccountNumber, PendingAccount> = BTreeMap::new();
    while let Some(result) = parser.next_record() {
        let line = parser.line_number;
        match result? {
            StoreRecord::Version(_) => {
                return Err(ParseError {
                    line,
                    message: "Duplicate version record".to_string(),
                }
                .into());
            }
            StoreRecord::Account {
                number,
                first_name,
                last_name,
                balance,
            } => {
                if pending.contains_key(&number) {
                    return Err(ParseError {
                        line,
                        message: format!("Duplicate account: '{}'", number),
                    }
                    .into());
                }
                pending.insert(
                    number,
                    PendingAccount {
                        line,
                        first_name,
                        last_name,
                        balance,
                        transactions: Vec::new(),
                    },
                );
            }
            StoreRecord::Transaction {
                number,
                transaction,
            } => match pending.get_mut(&number) {
                Some(account) => account.transactions.push(transaction),
                None => {
                    return Err(ParseError {
                        line,
                        message: format!("Transaction for unknown account: '{}'", number),
                    }
                    .into())
                }
            },
        }
    }

    let mut ledger = Ledger::with_overdraft_floor(overdraft_floor);
    for (number, entry) in pending {
        let account = Account::restore(
            entry.first_name,
            entry.last_name,
            number.clone(),
            entry.transactions,
        )
        .map_err(|e| ParseError {
            line: entry.line,
            message: e.to_string(),
        })?;
        if account.balance() != entry.balance {
            return Err(StoreError::BalanceMismatch {
                account: number,
                stored: entry.balance,
                computed: account.balance(),
            });
        }
        ledger.insert(account).map_err(|e| ParseError {
            line: entry.line,
            message: e.to_string(),
        })?;
    }

    Ok(ledger)
}
