use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Budget, CarryStrategy, Cents, Month, Transaction};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying budgets and transactions.
/// The ledger engine only reads from it; writes come from record
/// management and importers.
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

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Budget operations
    // ========================

    /// Insert or replace the budget for its `(category, month)` key.
    pub async fn upsert_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, category, month, amount_cents, carry_strategy, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (category, month) DO UPDATE SET
                amount_cents = excluded.amount_cents,
                carry_strategy = excluded.carry_strategy
            "#,
        )
        .bind(budget.id.to_string())
        .bind(&budget.category)
        .bind(budget.month.to_string())
        .bind(budget.amount_cents)
        .bind(budget.carry_strategy.as_str())
        .bind(budget.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save budget")?;
        Ok(())
    }

    /// Get the budget for a category-month, if any.
    pub async fn get_budget(&self, category: &str, month: Month) -> Result<Option<Budget>> {
        let row = sqlx::query(
            r#"
            SELECT id, category, month, amount_cents, carry_strategy, created_at
            FROM budgets
            WHERE category = ? AND month = ?
            "#,
        )
        .bind(category)
        .bind(month.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch budget")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    /// List every category's budget for a month, ordered by category.
    pub async fn list_budgets_for_month(&self, month: Month) -> Result<Vec<Budget>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, month, amount_cents, carry_strategy, created_at
            FROM budgets
            WHERE month = ?
            ORDER BY category
            "#,
        )
        .bind(month.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list budgets for month")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    /// Delete the budget for a category-month.
    pub async fn delete_budget(&self, category: &str, month: Month) -> Result<()> {
        sqlx::query("DELETE FROM budgets WHERE category = ? AND month = ?")
            .bind(category)
            .bind(month.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;
        Ok(())
    }

    /// Sum of budgeted amounts across all categories for a month.
    pub async fn sum_budgets_for_month(&self, month: Month) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM budgets
            WHERE month = ?
            "#,
        )
        .bind(month.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum budgets for month")?;

        Ok(row.get("total"))
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction.
    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, category, amount_cents, date, description, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(&transaction.category)
        .bind(transaction.amount_cents)
        .bind(transaction.date.to_rfc3339())
        .bind(&transaction.description)
        .bind(transaction.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// List all transactions for a category, ordered by date.
    pub async fn list_transactions_for_category(
        &self,
        category: &str,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, amount_cents, date, description, recorded_at
            FROM transactions
            WHERE category = ?
            ORDER BY date
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for category")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List all transactions within `[start, end)`, ordered by date.
    pub async fn list_transactions_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, amount_cents, date, description, recorded_at
            FROM transactions
            WHERE date >= ? AND date < ?
            ORDER BY date
            "#,
        )
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions in range")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List a category's expense transactions (amount < 0) within
    /// `[start, end)`, ordered by date.
    pub async fn list_expenses(
        &self,
        category: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, amount_cents, date, description, recorded_at
            FROM transactions
            WHERE category = ? AND amount_cents < 0 AND date >= ? AND date < ?
            ORDER BY date
            "#,
        )
        .bind(category)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Spend magnitude for a category within `[start, end)`, computed with
    /// SQL aggregation instead of loading rows.
    pub async fn sum_expenses(
        &self,
        category: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(-SUM(amount_cents), 0) as total
            FROM transactions
            WHERE category = ? AND amount_cents < 0 AND date >= ? AND date < ?
            "#,
        )
        .bind(category)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum expenses")?;

        Ok(row.get("total"))
    }

    /// Spend magnitude across all categorized transactions within
    /// `[start, end)`. Uncategorized transactions are excluded, matching
    /// the ledger engine.
    pub async fn sum_expenses_for_month(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(-SUM(amount_cents), 0) as total
            FROM transactions
            WHERE category IS NOT NULL AND amount_cents < 0 AND date >= ? AND date < ?
            "#,
        )
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum expenses for month")?;

        Ok(row.get("total"))
    }

    // ========================
    // Row mapping
    // ========================

    fn row_to_budget(row: &sqlx::sqlite::SqliteRow) -> Result<Budget> {
        let id_str: String = row.get("id");
        let month_str: String = row.get("month");
        let strategy_str: String = row.get("carry_strategy");
        let created_at_str: String = row.get("created_at");

        Ok(Budget {
            id: Uuid::parse_str(&id_str).context("Invalid budget ID")?,
            category: row.get("category"),
            month: month_str
                .parse::<Month>()
                .with_context(|| format!("Invalid budget month: {}", month_str))?,
            amount_cents: row.get("amount_cents"),
            carry_strategy: CarryStrategy::from_str(&strategy_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid carry strategy: {}", strategy_str))?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let date_str: String = row.get("date");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            category: row.get("category"),
            amount_cents: row.get("amount_cents"),
            date: DateTime::parse_from_rfc3339(&date_str)
                .context("Invalid transaction date")?
                .with_timezone(&Utc),
            description: row.get("description"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
