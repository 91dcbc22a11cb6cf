use thiserror::Error;

use crate::domain::{DecodeError, Units};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Owner not found: {0}")]
    NotFound(String),

    #[error("Owner already exists: {0}")]
    Duplicate(String),

    #[error("Insufficient funds for {owner}: balance {balance}, required {required}")]
    InsufficientFunds {
        owner: String,
        balance: Units,
        required: Units,
    },

    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Ledger schema error: {0}")]
    Schema(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownFunction(name) => AppError::UnknownFunction(name),
            other => AppError::Validation(other.to_string()),
        }
    }
}
