pub mod config;
pub mod domain;
pub mod error;
pub mod parser;
pub mod store;
pub mod teller;
pub mod writer;

pub use domain::DEFAULT_OVERDRAFT_FLOOR;
