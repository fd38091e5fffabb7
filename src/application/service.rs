use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Budget, BudgetLedger, CarryStrategy, Cents, Month, Transaction};
use crate::storage::Repository;

use super::ledger::{DEFAULT_MAX_LOOKBACK_MONTHS, LedgerBuilder};
use super::AppError;

/// Traffic-light classification of budget consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Good,
    Warning,
    Danger,
}

/// One category's position within a month, for dashboard overviews.
#[derive(Debug, Clone)]
pub struct CategoryBudgetStatus {
    pub budget: Budget,
    pub spent: Cents,
    pub carried_in: Cents,
    pub remaining: Cents,
    pub progress: f64,
    pub health: BudgetHealth,
}

/// Application service providing high-level operations over budgets,
/// transactions, and carryover ledgers. This is the primary interface for
/// any client (CLI, API, TUI, report generator, etc.).
pub struct LedgerService {
    repo: Repository,
    max_lookback: usize,
}

impl LedgerService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            max_lookback: DEFAULT_MAX_LOOKBACK_MONTHS,
        }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Cap carry resolution at `max_lookback` consecutive budgeted months.
    pub fn with_max_lookback(mut self, max_lookback: usize) -> Self {
        self.max_lookback = max_lookback;
        self
    }

    fn parse_month(key: &str) -> Result<Month, AppError> {
        key.parse()
            .map_err(|e| AppError::invalid_month(key, e))
    }

    fn validate_category(category: &str) -> Result<(), AppError> {
        if category.trim().is_empty() {
            return Err(AppError::InvalidCategory(
                "category must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    // ========================
    // Ledger engine
    // ========================

    /// Compute the carryover ledger for a category-month. Read-only; the
    /// result is derived fresh from current budgets and transactions and
    /// is never cached.
    pub async fn calculate_budget_ledger(
        &self,
        category: &str,
        month_key: &str,
    ) -> Result<BudgetLedger, AppError> {
        Self::validate_category(category)?;
        let month = Self::parse_month(month_key)?;
        LedgerBuilder::new(&self.repo)
            .with_max_lookback(self.max_lookback)
            .build(category, month)
            .await
    }

    /// Percentage of the budget consumed, clamped to [0, 100].
    /// A zero budget reports 0 regardless of spend.
    pub fn calculate_budget_progress(spent: Cents, budgeted: Cents) -> f64 {
        if budgeted == 0 {
            return 0.0;
        }
        let percent = spent as f64 / budgeted as f64 * 100.0;
        percent.min(100.0)
    }

    /// Classify budget consumption. Thresholds are strict: exactly 80% is
    /// still `Good`, exactly 100% is still `Warning`.
    pub fn budget_status(spent: Cents, budgeted: Cents) -> BudgetHealth {
        if budgeted == 0 {
            return BudgetHealth::Good;
        }
        let percent = spent as f64 / budgeted as f64 * 100.0;
        if percent > 100.0 {
            BudgetHealth::Danger
        } else if percent > 80.0 {
            BudgetHealth::Warning
        } else {
            BudgetHealth::Good
        }
    }

    /// Per-category ledger summary for every budget of a month.
    pub async fn month_overview(
        &self,
        month_key: &str,
    ) -> Result<Vec<CategoryBudgetStatus>, AppError> {
        let month = Self::parse_month(month_key)?;
        let budgets = self.repo.list_budgets_for_month(month).await?;
        let mut overview = Vec::with_capacity(budgets.len());

        for budget in budgets {
            let ledger = LedgerBuilder::new(&self.repo)
                .with_max_lookback(self.max_lookback)
                .build(&budget.category, month)
                .await?;

            overview.push(CategoryBudgetStatus {
                spent: ledger.total_spent,
                carried_in: ledger.total_carried_in,
                remaining: ledger.remaining,
                progress: Self::calculate_budget_progress(
                    ledger.total_spent,
                    budget.amount_cents,
                ),
                health: Self::budget_status(ledger.total_spent, budget.amount_cents),
                budget,
            });
        }

        Ok(overview)
    }

    // ========================
    // Monthly aggregates
    // ========================

    /// Sum of all categories' budgeted amounts for a month. Independent of
    /// the ledger engine; carry amounts are not included.
    pub async fn total_budgeted_for_month(&self, month_key: &str) -> Result<Cents, AppError> {
        let month = Self::parse_month(month_key)?;
        Ok(self.repo.sum_budgets_for_month(month).await?)
    }

    /// Sum of all categorized expense transactions within a month.
    pub async fn total_spent_for_month(&self, month_key: &str) -> Result<Cents, AppError> {
        let month = Self::parse_month(month_key)?;
        Ok(self
            .repo
            .sum_expenses_for_month(month.start(), month.end())
            .await?)
    }

    // ========================
    // Budget operations
    // ========================

    /// Create or replace the budget for `(category, month)`. The pair is
    /// the natural key, so setting it twice overwrites amount and strategy.
    pub async fn set_budget(
        &self,
        category: &str,
        month_key: &str,
        amount_cents: Cents,
        carry_strategy: CarryStrategy,
    ) -> Result<Budget, AppError> {
        Self::validate_category(category)?;
        let month = Self::parse_month(month_key)?;
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(
                "budgeted amount must not be negative".to_string(),
            ));
        }

        let budget = Budget::new(category, month, amount_cents, carry_strategy);
        self.repo.upsert_budget(&budget).await?;
        Ok(budget)
    }

    /// Get the budget for a category-month, if one exists.
    pub async fn get_budget(
        &self,
        category: &str,
        month_key: &str,
    ) -> Result<Option<Budget>, AppError> {
        let month = Self::parse_month(month_key)?;
        Ok(self.repo.get_budget(category, month).await?)
    }

    /// List every category's budget for a month.
    pub async fn list_budgets_for_month(&self, month_key: &str) -> Result<Vec<Budget>, AppError> {
        let month = Self::parse_month(month_key)?;
        Ok(self.repo.list_budgets_for_month(month).await?)
    }

    /// Delete the budget for a category-month. Deleting a missing budget
    /// is a no-op.
    pub async fn delete_budget(&self, category: &str, month_key: &str) -> Result<(), AppError> {
        let month = Self::parse_month(month_key)?;
        Ok(self.repo.delete_budget(category, month).await?)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a transaction. Negative amounts are expenses; positive
    /// amounts are income or refunds and never count as spend.
    pub async fn record_transaction(
        &self,
        category: Option<String>,
        amount_cents: Cents,
        date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        if let Some(category) = &category {
            Self::validate_category(category)?;
        }
        if amount_cents == 0 {
            return Err(AppError::InvalidAmount(
                "transaction amount must not be zero".to_string(),
            ));
        }

        let mut transaction = Transaction::new(category, amount_cents, date);
        if let Some(description) = description {
            transaction = transaction.with_description(description);
        }

        self.repo.save_transaction(&transaction).await?;
        Ok(transaction)
    }

    /// List all transactions for a category, oldest first.
    pub async fn list_transactions(&self, category: &str) -> Result<Vec<Transaction>, AppError> {
        Self::validate_category(category)?;
        Ok(self.repo.list_transactions_for_category(category).await?)
    }

    /// List all transactions within `[start, end)`, oldest first.
    pub async fn list_transactions_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions_in_range(start, end).await?)
    }
}
