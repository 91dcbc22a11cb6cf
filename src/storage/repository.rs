use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::{BalanceRecord, Units};

use super::SCHEMA_001_BALANCES;

/// Repository for persisting and querying balance records.
///
/// This is the only component that touches the store. Multi-row mutations
/// (fund-and-insert for approvals, debit-and-credit for transfers) are single
/// SQL transactions, so either both rows change or neither does; callers never
/// observe a half-applied operation.
#[derive(Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the balances table. Fails if the ledger already exists.
    pub async fn create_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA_001_BALANCES)
            .execute(&self.pool)
            .await
            .context("Failed to create balances table")?;
        Ok(())
    }

    /// Insert a new record. Returns false (without touching the table) if a
    /// record for the same owner already exists.
    pub async fn insert_record(&self, record: &BalanceRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO balances (owner, balance, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&record.owner)
        .bind(record.balance)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert balance record")?;

        Ok(result.rows_affected() == 1)
    }

    /// Get the record for an owner.
    pub async fn get_record(&self, owner: &str) -> Result<Option<BalanceRecord>> {
        let row = sqlx::query(
            r#"
            SELECT owner, balance, created_at
            FROM balances
            WHERE owner = ?
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch balance record")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    /// List all records, ordered by owner.
    pub async fn list_records(&self) -> Result<Vec<BalanceRecord>> {
        let rows = sqlx::query(
            "SELECT owner, balance, created_at FROM balances ORDER BY owner",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list balance records")?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// Debit `funder` and insert `record`, as one transaction.
    ///
    /// The guarded UPDATE re-checks the funder's balance inside the
    /// transaction; if the guard or the insert fails, the transaction rolls
    /// back on drop and the funder keeps its original balance.
    pub async fn insert_funded_record(
        &self,
        funder: &str,
        record: &BalanceRecord,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let debited = sqlx::query(
            r#"
            UPDATE balances
            SET balance = balance - ?
            WHERE owner = ? AND balance >= ?
            "#,
        )
        .bind(record.balance)
        .bind(funder)
        .bind(record.balance)
        .execute(&mut *tx)
        .await
        .context("Failed to debit funder")?;

        if debited.rows_affected() != 1 {
            bail!("funding debit failed for '{}'", funder);
        }

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO balances (owner, balance, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&record.owner)
        .bind(record.balance)
        .bind(record.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Failed to insert funded record")?;

        if inserted.rows_affected() != 1 {
            bail!("record for '{}' already exists", record.owner);
        }

        tx.commit().await.context("Failed to commit allocation")?;
        Ok(())
    }

    /// Move `amount` from one existing record to another, as one transaction.
    /// A sender debit is never committed without the matching receiver credit.
    pub async fn transfer_balance(&self, from: &str, to: &str, amount: Units) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let debited = sqlx::query(
            r#"
            UPDATE balances
            SET balance = balance - ?
            WHERE owner = ? AND balance >= ?
            "#,
        )
        .bind(amount)
        .bind(from)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .context("Failed to debit sender")?;

        if debited.rows_affected() != 1 {
            bail!("debit failed for '{}'", from);
        }

        let credited = sqlx::query(
            r#"
            UPDATE balances
            SET balance = balance + ?
            WHERE owner = ?
            "#,
        )
        .bind(amount)
        .bind(to)
        .execute(&mut *tx)
        .await
        .context("Failed to credit receiver")?;

        if credited.rows_affected() != 1 {
            bail!("credit failed: no record for '{}'", to);
        }

        tx.commit().await.context("Failed to commit transfer")?;
        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<BalanceRecord> {
        let created_at_str: String = row.get("created_at");

        Ok(BalanceRecord {
            owner: row.get("owner"),
            balance: row.get("balance"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
