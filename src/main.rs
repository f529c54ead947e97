use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process;

use simple_rust_teller::config::{Args, Config};
use simple_rust_teller::store::Store;
use simple_rust_teller::teller::Teller;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::from(Args::parse());
    let store = Store::new(&config.data_file);

    let ledger = store
        .load(config.overdraft_floor)
        .with_context(|| format!("Failed to load '{}'", store.path().display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut teller = Teller::new(ledger, stdin.lock(), stdout.lock()).with_color(config.color);
    teller.run().context("Teller session failed")?;

    store
        .save(teller.ledger())
        .with_context(|| format!("Failed to save '{}'", store.path().display()))?;

    let accounts = teller.ledger().len();
    drop(teller);
    let mut handle = io::stdout().lock();
    writeln!(
        handle,
        "Saved {} account(s) to {}",
        accounts,
        store.path().display()
    )?;

    Ok(())
}
