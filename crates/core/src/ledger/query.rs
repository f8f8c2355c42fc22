//! Presentation helpers over a list of debtors: filtering, sorting, stats
//! and per-debtor history insights. None of this affects ledger state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::{DebtEntry, Debtor};

/// Sort order for debtor lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Largest balance first.
    #[default]
    DebtDesc,
    /// Smallest balance first.
    DebtAsc,
    /// Alphabetical by alias, ignoring case.
    AliasAsc,
}

/// Filter and sort parameters for listing debtors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtorQuery {
    /// Case-insensitive substring of the alias.
    #[serde(default)]
    pub search: Option<String>,
    /// Sort order.
    #[serde(default)]
    pub sort: SortOrder,
    /// Inclusive lower bound on the balance.
    #[serde(default)]
    pub min_debt: Option<Decimal>,
    /// Inclusive upper bound on the balance.
    #[serde(default)]
    pub max_debt: Option<Decimal>,
}

impl DebtorQuery {
    /// Returns true if `debtor` passes every filter.
    #[must_use]
    pub fn matches(&self, debtor: &Debtor) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        if let Some(needle) = search
            && !debtor.alias().key().contains(&needle)
        {
            return false;
        }
        if self.min_debt.is_some_and(|min| debtor.total_debt() < min) {
            return false;
        }
        if self.max_debt.is_some_and(|max| debtor.total_debt() > max) {
            return false;
        }
        true
    }

    /// Filters and sorts `debtors`.
    #[must_use]
    pub fn apply(&self, debtors: Vec<Debtor>) -> Vec<Debtor> {
        let mut selected: Vec<Debtor> = debtors.into_iter().filter(|d| self.matches(d)).collect();

        match self.sort {
            SortOrder::DebtDesc => selected.sort_by(|a, b| {
                b.total_debt()
                    .cmp(&a.total_debt())
                    .then_with(|| a.alias().key().cmp(&b.alias().key()))
            }),
            SortOrder::DebtAsc => selected.sort_by(|a, b| {
                a.total_debt()
                    .cmp(&b.total_debt())
                    .then_with(|| a.alias().key().cmp(&b.alias().key()))
            }),
            SortOrder::AliasAsc => selected.sort_by_cached_key(|d| d.alias().key()),
        }

        selected
    }
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Number of open debtors.
    pub debtor_count: usize,
    /// Sum of all balances.
    pub total_outstanding: Decimal,
}

impl LedgerSummary {
    /// Summarizes a set of debtors.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the sum is not representable.
    pub fn from_debtors(debtors: &[Debtor]) -> Result<Self, LedgerError> {
        let total_outstanding = debtors.iter().try_fold(Decimal::ZERO, |acc, d| {
            acc.checked_add(d.total_debt())
                .ok_or(LedgerError::AmountOverflow {
                    total: acc,
                    amount: d.total_debt(),
                })
        })?;

        Ok(Self {
            debtor_count: debtors.len(),
            total_outstanding,
        })
    }
}

/// Dates derived from a debtor's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DebtorInsights {
    /// Earliest entry.
    pub debt_started_at: Option<DateTime<Utc>>,
    /// Latest entry of any kind.
    pub last_transaction_at: Option<DateTime<Utc>>,
    /// Latest payment.
    pub last_payment_at: Option<DateTime<Utc>>,
}

impl DebtorInsights {
    /// Derives insights from a debtor's entries.
    #[must_use]
    pub fn of(debtor: &Debtor) -> Self {
        let entries = debtor.debts();
        Self {
            debt_started_at: entries.iter().map(|e| e.date).min(),
            last_transaction_at: entries.iter().map(|e| e.date).max(),
            last_payment_at: entries
                .iter()
                .filter(|e| e.is_payment())
                .map(|e| e.date)
                .max(),
        }
    }
}

/// Entries ordered for display, most recent first.
#[must_use]
pub fn newest_first(debtor: &Debtor) -> Vec<DebtEntry> {
    let mut entries = debtor.debts().to_vec();
    // Reversed first so ties on date keep the latest insert on top.
    entries.reverse();
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}
