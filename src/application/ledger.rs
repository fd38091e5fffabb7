use tracing::{debug, trace};

use crate::domain::{BudgetLedger, Cents, Month, assemble_ledger, forwarded_carry};
use crate::storage::Repository;

use super::AppError;

/// Default cap on how many consecutive budgeted months carry resolution
/// walks back before treating the oldest month as carry-free.
pub const DEFAULT_MAX_LOOKBACK_MONTHS: usize = 60;

/// Resolves the carry pair for a category-month by walking the chain of
/// consecutive budgeted months before it.
///
/// The previous month's strategy governs what is carried in: the policy
/// that produced a surplus or deficit decides whether it is forwarded,
/// not the receiving month's policy. The walk stops at the first month
/// with no budget (a gap is a terminal state, not an error) or at
/// `max_lookback` months, whichever comes first.
pub(crate) struct CarryoverResolver<'a> {
    repo: &'a Repository,
    max_lookback: usize,
}

impl<'a> CarryoverResolver<'a> {
    pub(crate) fn new(repo: &'a Repository, max_lookback: usize) -> Self {
        Self { repo, max_lookback }
    }

    /// Returns `(carry_in, carry_out_of_previous)` for `month`.
    /// `carry_in` is signed (negative for an inherited deficit);
    /// `carry_out_of_previous` is its magnitude, the amount the previous
    /// month reports as carried out.
    pub(crate) async fn resolve(
        &self,
        category: &str,
        month: Month,
    ) -> Result<(Cents, Cents), AppError> {
        // Walk backward over consecutive budgeted months. The first gap
        // is a hard stop; resolution never reaches past it.
        let mut chain = Vec::new();
        let mut cursor = month.previous();
        while chain.len() < self.max_lookback {
            match self.repo.get_budget(category, cursor).await? {
                Some(budget) => {
                    trace!(%category, month = %cursor, "carry chain includes month");
                    chain.push(budget);
                    cursor = cursor.previous();
                }
                None => break,
            }
        }

        if chain.is_empty() {
            return Ok((0, 0));
        }

        // Fold forward from the oldest month in the chain. Each month's
        // remaining feeds the next via its own carry strategy. The oldest
        // month inherits nothing, either because a gap precedes it or
        // because the look-back cap truncated the chain there.
        let mut carried: Cents = 0;
        for budget in chain.iter().rev() {
            let spent = self
                .repo
                .sum_expenses(category, budget.month.start(), budget.month.end())
                .await?;
            let remaining = budget.amount_cents + carried - spent;
            carried = forwarded_carry(budget.carry_strategy, remaining);
        }

        debug!(
            %category,
            %month,
            chain_len = chain.len(),
            carry_in = carried,
            "resolved carryover"
        );
        Ok((carried, carried.abs()))
    }
}

/// Assembles one category-month's ledger: budget lookup, expense fetch,
/// carry resolution, entry construction.
///
/// Computation is read-only and stateless, so concurrent builds need no
/// coordination among themselves. The multi-month read sequence is not
/// transactionally isolated, though: a write landing between two reads can
/// be observed by part of a single build. Callers that need a strictly
/// consistent ledger should quiesce writes around the call.
pub struct LedgerBuilder<'a> {
    repo: &'a Repository,
    max_lookback: usize,
}

impl<'a> LedgerBuilder<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            max_lookback: DEFAULT_MAX_LOOKBACK_MONTHS,
        }
    }

    pub fn with_max_lookback(mut self, max_lookback: usize) -> Self {
        self.max_lookback = max_lookback;
        self
    }

    /// Build the ledger for `(category, month)`. A category-month with no
    /// budget record yields the canonical empty ledger.
    pub async fn build(&self, category: &str, month: Month) -> Result<BudgetLedger, AppError> {
        let Some(budget) = self.repo.get_budget(category, month).await? else {
            debug!(%category, %month, "no budget record, returning empty ledger");
            return Ok(BudgetLedger::empty(category, month));
        };

        let expenses = self
            .repo
            .list_expenses(category, month.start(), month.end())
            .await?;

        let resolver = CarryoverResolver::new(self.repo, self.max_lookback);
        let (carry_in, _) = resolver.resolve(category, month).await?;

        Ok(assemble_ledger(&budget, carry_in, &expenses))
    }
}
