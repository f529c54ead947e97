use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::types::Amount;
use crate::domain::Ledger;
use crate::error::StoreError;
use crate::parser::read_ledger;
use crate::writer::write_ledger;

/// The ledger file on disk. Whole-file reads and writes only.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger. A missing file is an empty ledger, not an error.
    pub fn load(&self, overdraft_floor: Amount) -> Result<Ledger, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Ledger::with_overdraft_floor(overdraft_floor))
            }
            Err(e) => return Err(e.into()),
        };
        read_ledger(BufReader::new(file), overdraft_floor)
    }

    /// Overwrites the file with the full ledger, creating parent directories.
    pub fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        write_ledger(&mut writer, ledger)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AccountNumber;
    use crate::DEFAULT_OVERDRAFT_FLOOR;
    use std::env;
    use std::process;

    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir()
            .join(format!("simple-rust-teller-{}-{}", process::id(), name))
            .join("accounts.csv")
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str_rounded(s).expect("failed to parse amount")
    }

    fn number(s: &str) -> AccountNumber {
        s.parse().expect("valid account number")
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let store = Store::new(scratch_path("missing"));
        let ledger = store.load(amount("-100")).expect("missing file is not an error");
        assert!(ledger.is_empty());
        assert_eq!(ledger.overdraft_floor(), amount("-100"));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let path = scratch_path("round-trip");
        let store = Store::new(&path);

        let mut ledger = Ledger::new();
        ledger
            .open_account("Bob", "Jones", number("11111"), amount("300"))
            .expect("opens");
        ledger
            .open_account("Carol", "Lee", number("22222"), amount("100"))
            .expect("opens");
        ledger
            .transfer(&number("11111"), &number("22222"), amount("200"))
            .expect("transfer admitted");

        store.save(&ledger).expect("save succeeds");
        let loaded = store.load(DEFAULT_OVERDRAFT_FLOOR).expect("load succeeds");
        assert_eq!(loaded, ledger);

        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn test_save_overwrites_previous_state() {
        let path = scratch_path("overwrite");
        let store = Store::new(&path);

        let mut ledger = Ledger::new();
        ledger
            .open_account("Bob", "Jones", number("11111"), amount("300"))
            .expect("opens");
        store.save(&ledger).expect("first save");
        store.save(&Ledger::new()).expect("second save");

        let loaded = store.load(DEFAULT_OVERDRAFT_FLOOR).expect("load succeeds");
        assert!(loaded.is_empty());

        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }
}
