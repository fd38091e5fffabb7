// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use riporto::application::LedgerService;
use riporto::domain::{CarryStrategy, Cents};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Record an expense (negative amount) for a category on a given day.
pub async fn spend(
    service: &LedgerService,
    category: &str,
    amount_cents: Cents,
    date: &str,
) -> Result<()> {
    service
        .record_transaction(
            Some(category.to_string()),
            -amount_cents,
            parse_date(date),
            None,
        )
        .await?;
    Ok(())
}

/// Set a budget for a category-month.
pub async fn budget(
    service: &LedgerService,
    category: &str,
    month: &str,
    amount_cents: Cents,
    strategy: CarryStrategy,
) -> Result<()> {
    service
        .set_budget(category, month, amount_cents, strategy)
        .await?;
    Ok(())
}
