mod common;

use anyhow::Result;
use common::{budget, parse_date, spend, test_service};
use riporto::application::AppError;
use riporto::domain::{CarryStrategy, EntryKind};

#[tokio::test]
async fn test_missing_budget_yields_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Transactions alone do not make a ledger.
    spend(&service, "groceries", 5000, "2024-01-10").await?;

    let ledger = service.calculate_budget_ledger("groceries", "2024-01").await?;
    assert!(ledger.is_empty());
    assert_eq!(ledger.total_budgeted, 0);
    assert_eq!(ledger.total_spent, 0);
    assert_eq!(ledger.total_carried_in, 0);
    assert_eq!(ledger.total_carried_out, 0);
    assert_eq!(ledger.remaining, 0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_category_is_not_an_error() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let ledger = service.calculate_budget_ledger("nonexistent", "2024-01").await?;
    assert!(ledger.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_entry_shape_and_order() -> Result<()> {
    let (service, _temp) = test_service().await?;

    budget(&service, "groceries", "2024-01", 10000, CarryStrategy::Unspent).await?;
    spend(&service, "groceries", 8000, "2024-01-01").await?;
    budget(&service, "groceries", "2024-02", 10000, CarryStrategy::Unspent).await?;
    spend(&service, "groceries", 3000, "2024-02-20").await?;
    spend(&service, "groceries", 1000, "2024-02-05").await?;

    let ledger = service.calculate_budget_ledger("groceries", "2024-02").await?;

    // Exactly one Budgeted, one CarryIn, one Spent per expense, one CarryOut.
    let count = |kind: EntryKind| ledger.entries.iter().filter(|e| e.kind == kind).count();
    assert_eq!(count(EntryKind::Budgeted), 1);
    assert_eq!(count(EntryKind::CarryIn), 1);
    assert_eq!(count(EntryKind::Spent), 2);
    assert_eq!(count(EntryKind::CarryOut), 1);

    // Non-decreasing by date, with the month's bookends in place.
    let dates: Vec<_> = ledger.entries.iter().map(|e| e.date).collect();
    assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ledger.entries.first().unwrap().date, parse_date("2024-02-01"));
    assert_eq!(ledger.entries.last().unwrap().date, parse_date("2024-03-01"));

    // Invariant: remaining == (budgeted + carried in) - spent.
    assert_eq!(
        ledger.remaining,
        ledger.total_budgeted + ledger.total_carried_in - ledger.total_spent
    );
    // Carry-in is reported separately, never folded into the budgeted total.
    assert_eq!(ledger.total_budgeted, 10000);
    assert_eq!(ledger.total_carried_in, 2000);
    assert_eq!(ledger.total_spent, 4000);

    Ok(())
}

#[tokio::test]
async fn test_income_and_refunds_are_not_spend() -> Result<()> {
    let (service, _temp) = test_service().await?;

    budget(&service, "groceries", "2024-01", 10000, CarryStrategy::None).await?;
    spend(&service, "groceries", 4000, "2024-01-10").await?;
    // A refund in the same category.
    service
        .record_transaction(
            Some("groceries".to_string()),
            1500,
            parse_date("2024-01-12"),
            Some("Returned item".to_string()),
        )
        .await?;

    let ledger = service.calculate_budget_ledger("groceries", "2024-01").await?;
    assert_eq!(ledger.total_spent, 4000);
    assert_eq!(
        ledger.entries.iter().filter(|e| e.kind == EntryKind::Spent).count(),
        1
    );

    Ok(())
}

#[tokio::test]
async fn test_uncategorized_transactions_are_excluded() -> Result<()> {
    let (service, _temp) = test_service().await?;

    budget(&service, "groceries", "2024-01", 10000, CarryStrategy::None).await?;
    spend(&service, "groceries", 3000, "2024-01-10").await?;
    service
        .record_transaction(None, -9999, parse_date("2024-01-11"), None)
        .await?;

    let ledger = service.calculate_budget_ledger("groceries", "2024-01").await?;
    assert_eq!(ledger.total_spent, 3000);

    Ok(())
}

#[tokio::test]
async fn test_transactions_outside_month_are_excluded() -> Result<()> {
    let (service, _temp) = test_service().await?;

    budget(&service, "groceries", "2024-02", 10000, CarryStrategy::None).await?;
    spend(&service, "groceries", 1000, "2024-01-31").await?;
    spend(&service, "groceries", 2000, "2024-02-01").await?;
    spend(&service, "groceries", 3000, "2024-02-29").await?;
    spend(&service, "groceries", 4000, "2024-03-01").await?;

    let ledger = service.calculate_budget_ledger("groceries", "2024-02").await?;
    assert_eq!(ledger.total_spent, 5000);

    Ok(())
}

#[tokio::test]
async fn test_malformed_month_key_is_a_validation_error() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for key in ["2024-13", "2024-1", "January", ""] {
        let result = service.calculate_budget_ledger("groceries", key).await;
        assert!(
            matches!(result, Err(AppError::InvalidMonth { .. })),
            "key {:?} should be rejected",
            key
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_empty_category_is_a_validation_error() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.calculate_budget_ledger("  ", "2024-01").await;
    assert!(matches!(result, Err(AppError::InvalidCategory(_))));

    Ok(())
}

#[tokio::test]
async fn test_set_budget_upserts_on_natural_key() -> Result<()> {
    let (service, _temp) = test_service().await?;

    budget(&service, "groceries", "2024-01", 10000, CarryStrategy::None).await?;
    budget(&service, "groceries", "2024-01", 20000, CarryStrategy::Unspent).await?;

    let stored = service.get_budget("groceries", "2024-01").await?.unwrap();
    assert_eq!(stored.amount_cents, 20000);
    assert_eq!(stored.carry_strategy, CarryStrategy::Unspent);

    let ledger = service.calculate_budget_ledger("groceries", "2024-01").await?;
    assert_eq!(ledger.total_budgeted, 20000);

    Ok(())
}

#[tokio::test]
async fn test_negative_budget_amount_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .set_budget("groceries", "2024-01", -100, CarryStrategy::None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    Ok(())
}

#[tokio::test]
async fn test_deleted_budget_leaves_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;

    budget(&service, "groceries", "2024-01", 10000, CarryStrategy::None).await?;
    spend(&service, "groceries", 3000, "2024-01-10").await?;
    service.delete_budget("groceries", "2024-01").await?;

    let ledger = service.calculate_budget_ledger("groceries", "2024-01").await?;
    assert!(ledger.is_empty());

    Ok(())
}
