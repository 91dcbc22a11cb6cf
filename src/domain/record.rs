use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balances are whole integer units. Arithmetic is done on `i64` so that
/// debits and credits compose; the store persists the same representation.
pub type Units = i64;

/// The distinguished owner that funds every allocation.
pub const ADMIN_OWNER: &str = "admin";

/// Balance the admin record is seeded with unless overridden at init.
pub const DEFAULT_SEED_BALANCE: Units = 1000;

/// A single ledger row: an owner identifier and its current balance.
/// `owner` is the primary key; records are created once (at init for admin,
/// by an approval for everyone else) and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub owner: String,
    pub balance: Units,
    pub created_at: DateTime<Utc>,
}

impl BalanceRecord {
    pub fn new(owner: impl Into<String>, balance: Units) -> Self {
        Self {
            owner: owner.into(),
            balance,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.owner == ADMIN_OWNER
    }
}

/// Parse an external amount representation into units.
/// Example: "300" -> 300, "  42 " -> 42, "-5" -> -5
pub fn parse_units(input: &str) -> Result<Units, ParseUnitsError> {
    input
        .trim()
        .parse::<Units>()
        .map_err(|_| ParseUnitsError::InvalidFormat(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseUnitsError {
    InvalidFormat(String),
}

impl fmt::Display for ParseUnitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseUnitsError::InvalidFormat(input) => {
                write!(f, "invalid amount '{}': expected an integer", input)
            }
        }
    }
}

impl std::error::Error for ParseUnitsError {}
