//! Controller inventory: tolerant text-table parsing and the StorCLI client

pub mod client;
pub mod grammar;
pub mod table;

pub use client::{StorcliClient, StorcliConfig};
pub use grammar::StorcliGrammar;
