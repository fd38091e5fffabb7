use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Budget, CarryStrategy, Cents, Month, Transaction, format_cents};

/// The amount a month forwards to its successor, given the month's own
/// carry strategy and remaining balance. Signed: positive for a surplus
/// (`Unspent`), negative for a deficit (`Overspend`), zero otherwise.
pub fn forwarded_carry(strategy: CarryStrategy, remaining: Cents) -> Cents {
    match strategy {
        CarryStrategy::None => 0,
        CarryStrategy::Unspent => remaining.max(0),
        CarryStrategy::Overspend => remaining.min(0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Budgeted,
    CarryIn,
    Spent,
    CarryOut,
}

/// One line of the audit trail. Display-only: entries are never persisted
/// or fed back into computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: EntryKind,
    /// Signed amount. Spent entries carry the spend magnitude; carry
    /// entries keep their sign so the trail shows direction.
    pub amount_cents: Cents,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// The reconciliation of one category-month: budget vs. actual spend vs.
/// inherited carry. Derived fresh on every query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLedger {
    pub category: String,
    pub month: Month,
    /// Entries in non-decreasing date order.
    pub entries: Vec<LedgerEntry>,
    pub total_budgeted: Cents,
    pub total_spent: Cents,
    /// Signed: negative when a deficit was inherited.
    pub total_carried_in: Cents,
    /// Magnitude of whatever this month forwards to the next.
    pub total_carried_out: Cents,
    /// `(total_budgeted + total_carried_in) - total_spent`.
    pub remaining: Cents,
}

impl BudgetLedger {
    /// The canonical empty ledger: the valid terminal state for a
    /// category-month with no budget record.
    pub fn empty(category: impl Into<String>, month: Month) -> Self {
        Self {
            category: category.into(),
            month,
            entries: Vec::new(),
            total_budgeted: 0,
            total_spent: 0,
            total_carried_in: 0,
            total_carried_out: 0,
            remaining: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for BudgetLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.category, self.month)?;
        for entry in &self.entries {
            writeln!(
                f,
                "  {} {:>10}  {}",
                entry.date.format("%Y-%m-%d"),
                format_cents(entry.amount_cents),
                entry.description
            )?;
        }
        write!(f, "  remaining {}", format_cents(self.remaining))
    }
}

/// Assemble a category-month ledger from its budget, the carry inherited
/// from the previous month, and the month's expense transactions.
///
/// `total_budgeted` stays the raw budgeted figure; carry-in is reported
/// separately and never folded into it. The forward-looking carry-out is
/// governed by this month's own strategy, while `carry_in` was governed by
/// the previous month's (see `CarryoverResolver`).
pub fn assemble_ledger(budget: &Budget, carry_in: Cents, expenses: &[Transaction]) -> BudgetLedger {
    let month = budget.month;
    let total_spent: Cents = expenses.iter().map(Transaction::spend_cents).sum();
    let remaining = budget.amount_cents + carry_in - total_spent;
    let carry_out = forwarded_carry(budget.carry_strategy, remaining);

    let mut entries = Vec::with_capacity(expenses.len() + 3);
    entries.push(LedgerEntry {
        kind: EntryKind::Budgeted,
        amount_cents: budget.amount_cents,
        description: format!("Monthly budget for {}", month),
        date: month.start(),
    });
    if carry_in != 0 {
        entries.push(LedgerEntry {
            kind: EntryKind::CarryIn,
            amount_cents: carry_in,
            description: format!("Carried over from {}", month.previous()),
            date: month.start(),
        });
    }
    for tx in expenses.iter().filter(|tx| tx.is_expense()) {
        entries.push(LedgerEntry {
            kind: EntryKind::Spent,
            amount_cents: tx.spend_cents(),
            description: tx.description.clone().unwrap_or_else(|| "Expense".to_string()),
            date: tx.date,
        });
    }
    if carry_out != 0 {
        let description = if carry_out > 0 {
            format!("Unspent carried forward to {}", month.next())
        } else {
            format!("Overspend carried forward to {}", month.next())
        };
        entries.push(LedgerEntry {
            kind: EntryKind::CarryOut,
            amount_cents: carry_out,
            description,
            date: month.end(),
        });
    }
    // Stable: same-date entries keep Budgeted/CarryIn before Spent.
    entries.sort_by_key(|entry| entry.date);

    BudgetLedger {
        category: budget.category.clone(),
        month,
        entries,
        total_budgeted: budget.amount_cents,
        total_spent,
        total_carried_in: carry_in,
        total_carried_out: carry_out.abs(),
        remaining,
    }
}
