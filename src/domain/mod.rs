pub mod account;
pub mod ledger;
pub mod transaction;
pub mod types;

pub use account::Account;
pub use ledger::{transfer, Ledger, DEFAULT_OVERDRAFT_FLOOR};
pub use transaction::Transaction;
pub use types::{AccountNumber, Amount, TransactionKind};
