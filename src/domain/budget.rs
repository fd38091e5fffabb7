use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, Month};

pub type BudgetId = Uuid;

/// How a month's leftover (or overrun) is forwarded to the next month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarryStrategy {
    /// Nothing is forwarded; every month starts clean.
    None,
    /// A positive remaining balance is forwarded as extra headroom.
    Unspent,
    /// A negative remaining balance is forwarded as a deficit.
    Overspend,
}

impl CarryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarryStrategy::None => "none",
            CarryStrategy::Unspent => "unspent",
            CarryStrategy::Overspend => "overspend",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(CarryStrategy::None),
            "unspent" => Some(CarryStrategy::Unspent),
            "overspend" => Some(CarryStrategy::Overspend),
            _ => None,
        }
    }
}

impl std::fmt::Display for CarryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A per-category, per-month spending target.
/// `(category, month)` is the natural key: one budget per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub category: String,
    pub month: Month,
    /// Budgeted amount for the month, never negative.
    pub amount_cents: Cents,
    pub carry_strategy: CarryStrategy,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        month: Month,
        amount_cents: Cents,
        carry_strategy: CarryStrategy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            month,
            amount_cents,
            carry_strategy,
            created_at: Utc::now(),
        }
    }
}
