mod repository;

pub use repository::*;

/// SQL schema for the balances table, executed once at ledger initialization.
pub const SCHEMA_001_BALANCES: &str = include_str!("migrations/001_balances.sql");
