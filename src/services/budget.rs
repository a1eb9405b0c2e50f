//! Budget and tax calculations
//!
//! Stateless helpers over amounts already computed from the ledger.

use std::fmt;

use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::Money;

/// Outcome of comparing spending with a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetStatus {
    WithinBudget,
    OverBudget,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithinBudget => write!(f, "Within budget"),
            Self::OverBudget => write!(f, "Over budget"),
        }
    }
}

/// Compare total spending with a budget limit.
///
/// Spending exactly equal to the limit is still within budget.
pub fn budget_check(total: Money, limit: Money) -> BudgetStatus {
    if total > limit {
        BudgetStatus::OverBudget
    } else {
        BudgetStatus::WithinBudget
    }
}

/// Budget check with the amounts needed to report on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    pub total: Money,
    pub limit: Money,
    pub status: BudgetStatus,
}

impl BudgetReport {
    /// Build a report for `total` spending against `limit`
    pub fn new(total: Money, limit: Money) -> Self {
        Self {
            total,
            limit,
            status: budget_check(total, limit),
        }
    }

    /// Amount left before the limit is reached, zero when over
    pub fn remaining(&self) -> Money {
        match self.status {
            BudgetStatus::WithinBudget => self.limit - self.total,
            BudgetStatus::OverBudget => Money::zero(),
        }
    }

    /// Amount spent beyond the limit, zero when within
    pub fn excess(&self) -> Money {
        match self.status {
            BudgetStatus::WithinBudget => Money::zero(),
            BudgetStatus::OverBudget => self.total - self.limit,
        }
    }

    /// Share of the limit used, as a percentage. None for a zero limit.
    pub fn percent_used(&self) -> Option<f64> {
        if self.limit.is_positive() {
            Some(self.total.as_f64() / self.limit.as_f64() * 100.0)
        } else {
            None
        }
    }
}

/// Estimated tax on `income` at `rate_percent`, rounded to the nearest cent
pub fn estimate_tax(income: Money, rate_percent: f64) -> Money {
    let cents = (income.cents() as f64 * rate_percent / 100.0).round();
    Money::from_cents(cents as i64)
}

/// Check tax inputs before estimating
pub fn validate_tax_input(income: Money, rate_percent: f64) -> TrackerResult<()> {
    if income.is_negative() {
        return Err(TrackerError::Validation("Income cannot be negative".into()));
    }
    if !(0.0..=100.0).contains(&rate_percent) {
        return Err(TrackerError::Validation(format!(
            "Tax rate must be between 0 and 100, got {}",
            rate_percent
        )));
    }
    Ok(())
}
