use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;

/// A single money movement as recorded by the user or an importer.
/// Amounts are signed: negative = expense, positive = income/refund.
/// Only negative amounts count as spend for budget ledgers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Budget category. Uncategorized transactions are excluded from
    /// ledger computation.
    pub category: Option<String>,
    /// Signed amount in cents.
    pub amount_cents: Cents,
    /// When the transaction occurred in the real world.
    pub date: DateTime<Utc>,
    /// Human-readable description.
    pub description: Option<String>,
    /// When we recorded this transaction in the system.
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(category: Option<String>, amount_cents: Cents, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            amount_cents,
            date,
            description: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if this transaction counts as spend.
    pub fn is_expense(&self) -> bool {
        self.amount_cents < 0
    }

    /// Spend magnitude (positive) for an expense, zero otherwise.
    pub fn spend_cents(&self) -> Cents {
        if self.is_expense() {
            -self.amount_cents
        } else {
            0
        }
    }
}
