use clap::Parser;
use std::path::PathBuf;

use crate::domain::types::Amount;
use crate::domain::DEFAULT_OVERDRAFT_FLOOR;

pub const DEFAULT_DATA_FILE: &str = "data/accounts.csv";

#[derive(Parser, Debug)]
#[command(name = "simple-rust-teller", version, about = "Interactive bank teller")]
pub struct Args {
    /// Ledger file, created on exit if it does not exist
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Lowest balance a withdrawal or transfer may leave behind
    #[arg(long, default_value = "-500.00", allow_hyphen_values = true, value_parser = parse_floor)]
    pub overdraft_floor: Amount,

    /// Print warnings without colour
    #[arg(long)]
    pub no_color: bool,
}

fn parse_floor(s: &str) -> Result<Amount, String> {
    let floor = Amount::parse_exact(s).map_err(|e| format!("'{}' is not an amount: {}", s, e))?;
    if floor.is_positive() {
        return Err(format!("overdraft floor must not be positive, got {}", floor));
    }
    Ok(floor)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    pub overdraft_floor: Amount,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            overdraft_floor: DEFAULT_OVERDRAFT_FLOOR,
            color: true,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            data_file: args.data_file,
            overdraft_floor: args.overdraft_floor,
            color: !args.no_color,
        }
    }
}
