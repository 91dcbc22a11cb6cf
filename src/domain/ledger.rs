use super::{BalanceRecord, Units};

/// Debit `amount` from `balance`, rejecting anything that would leave the
/// balance negative. All ledger mutations go through this and `credit` so the
/// non-negativity invariant is checked in exactly one place.
pub fn debit(balance: Units, amount: Units) -> Result<Units, BalanceError> {
    let new_balance = balance.checked_sub(amount).ok_or(BalanceError::Overflow)?;
    if new_balance < 0 {
        return Err(BalanceError::Insufficient {
            balance,
            requested: amount,
        });
    }
    Ok(new_balance)
}

/// Credit `amount` to `balance`.
pub fn credit(balance: Units, amount: Units) -> Result<Units, BalanceError> {
    balance.checked_add(amount).ok_or(BalanceError::Overflow)
}

/// Sum of all balances. Allocations and transfers move units between records
/// without creating or destroying them, so this total is invariant after init.
pub fn total_balance(records: &[BalanceRecord]) -> Units {
    records.iter().map(|r| r.balance).sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    Insufficient { balance: Units, requested: Units },
    Overflow,
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::Insufficient { balance, requested } => {
                write!(
                    f,
                    "insufficient funds: balance {}, requested {}",
                    balance, requested
                )
            }
            BalanceError::Overflow => write!(f, "balance arithmetic overflow"),
        }
    }
}

impl std::error::Error for BalanceError {}
