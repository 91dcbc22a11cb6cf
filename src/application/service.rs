use serde::Serialize;

use crate::domain::{
    ADMIN_OWNER, BalanceError, BalanceRecord, Operation, Units, credit, debit,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, hosting platform, tests).
#[derive(Debug)]
pub struct LedgerService {
    repo: Repository,
}

/// Result of an approval: the new applicant record and the debited admin record.
#[derive(Debug, Serialize)]
pub struct ApprovalResult {
    pub applicant: BalanceRecord,
    pub admin: BalanceRecord,
}

/// Result of a transfer: both records with their post-transfer balances.
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub sender: BalanceRecord,
    pub receiver: BalanceRecord,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new ledger at the given path: create the database file,
    /// the balances table, and the seed admin record.
    pub async fn init(database_path: &str, seed_balance: Units) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::connect(&db_url).await?;
        let service = Self::new(repo);
        service.init_ledger(seed_balance).await?;
        Ok(service)
    }

    /// Connect to an existing ledger database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Create the ledger table and seed the admin funding record.
    /// Called exactly once per ledger lifetime; fails if the table exists.
    pub async fn init_ledger(&self, seed_balance: Units) -> Result<BalanceRecord, AppError> {
        if seed_balance < 0 {
            return Err(AppError::Validation(format!(
                "seed balance must not be negative, got {}",
                seed_balance
            )));
        }

        self.repo
            .create_schema()
            .await
            .map_err(|e| AppError::Schema(e.to_string()))?;

        let admin = BalanceRecord::new(ADMIN_OWNER, seed_balance);
        if !self.repo.insert_record(&admin).await? {
            return Err(AppError::Duplicate(ADMIN_OWNER.to_string()));
        }

        Ok(admin)
    }

    // ========================
    // Ledger operations
    // ========================

    /// Allocate `amount` from the admin balance to a new applicant.
    pub async fn approve(
        &self,
        applicant: &str,
        amount: Units,
    ) -> Result<ApprovalResult, AppError> {
        let applicant = validate_owner("applicant", applicant)?;
        validate_amount(amount)?;

        // Admin record missing means the ledger was never initialized.
        let mut admin = self
            .repo
            .get_record(ADMIN_OWNER)
            .await?
            .ok_or_else(|| AppError::NotFound(ADMIN_OWNER.to_string()))?;

        // An applicant may be approved only once; topping up an existing
        // record would need a separate increase operation.
        if self.repo.get_record(&applicant).await?.is_some() {
            return Err(AppError::Duplicate(applicant));
        }

        admin.balance = checked_debit(ADMIN_OWNER, admin.balance, amount)?;

        let record = BalanceRecord::new(applicant, amount);
        self.repo.insert_funded_record(ADMIN_OWNER, &record).await?;

        Ok(ApprovalResult {
            applicant: record,
            admin,
        })
    }

    /// Move `amount` from `sender`'s balance to `receiver`'s balance.
    /// Receivers are never auto-created; only approval creates new owners.
    pub async fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: Units,
    ) -> Result<TransferResult, AppError> {
        let sender = validate_owner("sender", sender)?;
        let receiver = validate_owner("receiver", receiver)?;
        if sender == receiver {
            return Err(AppError::Validation(format!(
                "sender and receiver must differ, both are '{}'",
                sender
            )));
        }
        validate_amount(amount)?;

        let mut sender_record = self
            .repo
            .get_record(&sender)
            .await?
            .ok_or_else(|| AppError::NotFound(sender.clone()))?;

        sender_record.balance = checked_debit(&sender, sender_record.balance, amount)?;

        let mut receiver_record = self
            .repo
            .get_record(&receiver)
            .await?
            .ok_or_else(|| AppError::NotFound(receiver.clone()))?;

        receiver_record.balance = credit(receiver_record.balance, amount)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repo.transfer_balance(&sender, &receiver, amount).await?;

        Ok(TransferResult {
            sender: sender_record,
            receiver: receiver_record,
        })
    }

    /// Read the balance record for an owner. No side effects.
    pub async fn read(&self, owner: &str) -> Result<BalanceRecord, AppError> {
        let owner = validate_owner("owner", owner)?;
        self.repo
            .get_record(&owner)
            .await?
            .ok_or(AppError::NotFound(owner))
    }

    /// List all balance records.
    pub async fn balances(&self) -> Result<Vec<BalanceRecord>, AppError> {
        Ok(self.repo.list_records().await?)
    }

    // ========================
    // Invocation surface
    // ========================

    /// Dispatch a mutating invocation by function name.
    /// Known functions: `approve`, `transfer`.
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, AppError> {
        match Operation::decode_invoke(function, args)? {
            Operation::Approve { applicant, amount } => {
                let result = self.approve(&applicant, amount).await?;
                to_bytes(&result)
            }
            Operation::Transfer {
                sender,
                receiver,
                amount,
            } => {
                let result = self.transfer(&sender, &receiver, amount).await?;
                to_bytes(&result)
            }
            // decode_invoke never yields Read; keep the match exhaustive.
            Operation::Read { .. } => Err(AppError::UnknownFunction(function.to_string())),
        }
    }

    /// Dispatch a read-only query by function name. Known functions: `read`.
    pub async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, AppError> {
        match Operation::decode_query(function, args)? {
            Operation::Read { owner } => {
                let record = self.read(&owner).await?;
                to_bytes(&record)
            }
            // decode_query never yields a mutating operation.
            _ => Err(AppError::UnknownFunction(function.to_string())),
        }
    }
}

fn validate_owner(role: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!(
            "{} identifier must not be empty",
            role
        )));
    }
    Ok(value.to_string())
}

fn validate_amount(amount: Units) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

fn checked_debit(owner: &str, balance: Units, amount: Units) -> Result<Units, AppError> {
    debit(balance, amount).map_err(|e| match e {
        BalanceError::Insufficient { balance, requested } => AppError::InsufficientFunds {
            owner: owner.to_string(),
            balance,
            required: requested,
        },
        BalanceError::Overflow => AppError::Validation(e.to_string()),
    })
}

fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(value).map_err(|e| AppError::Database(anyhow::Error::new(e)))
}
