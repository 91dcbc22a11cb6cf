// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use polizza::Units;
use polizza::application::LedgerService;
use tempfile::TempDir;

/// Seed balance used by the standard test ledger.
pub const SEED: Units = 1000;

/// Helper to create an initialized test ledger on a temporary database,
/// seeded with the standard admin balance.
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    test_service_with_seed(SEED).await
}

/// Same as `test_service`, with an explicit seed balance.
pub async fn test_service_with_seed(seed: Units) -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), seed).await?;
    Ok((service, temp_dir))
}

/// Sum of all balances; used to assert the conservation law.
pub async fn ledger_total(service: &LedgerService) -> Result<Units> {
    let records = service.balances().await?;
    Ok(polizza::total_balance(&records))
}
