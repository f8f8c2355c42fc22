//! Ledger domain types.
//!
//! A `Debtor` owns an append-only list of signed entries plus a cached
//! running total. The total is only ever changed together with an entry
//! append, and persisted records are checked on load.

use chrono::{DateTime, Utc};
use debttracker_shared::types::{DebtorId, EntryId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::validation::{DebtorAlias, PositiveAmount};

/// Identity of the user on whose behalf a ledger operation runs.
///
/// Every read and write is scoped to this owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerContext {
    /// The owning user.
    pub user_id: UserId,
}

impl OwnerContext {
    /// Creates a context for `user_id`.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// A single signed ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Positive for a debt incurred, negative for a payment received.
    pub amount: Decimal,
    /// When the event happened.
    pub date: DateTime<Utc>,
}

impl DebtEntry {
    /// Returns true if this entry records a payment.
    #[must_use]
    pub fn is_payment(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

/// A named party who owes the owner money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Debtor {
    id: DebtorId,
    owner_id: UserId,
    alias: DebtorAlias,
    total_debt: Decimal,
    debts: Vec<DebtEntry>,
    #[serde(skip)]
    version: i64,
}

impl Debtor {
    /// Opens a new debtor record with its first debt.
    #[must_use]
    pub fn open(
        owner: &OwnerContext,
        alias: DebtorAlias,
        amount: PositiveAmount,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DebtorId::new(),
            owner_id: owner.user_id,
            alias,
            total_debt: amount.value(),
            debts: vec![DebtEntry {
                id: EntryId::new(),
                amount: amount.value(),
                date: at,
            }],
            version: 0,
        }
    }

    /// Rebuilds a debtor from persisted parts.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Inconsistent` if `total_debt` does not equal the
    /// sum of the entries.
    pub fn from_parts(
        id: DebtorId,
        owner_id: UserId,
        alias: DebtorAlias,
        total_debt: Decimal,
        debts: Vec<DebtEntry>,
        version: i64,
    ) -> Result<Self, LedgerError> {
        let computed = sum_entries(&debts).ok_or(LedgerError::Inconsistent {
            debtor_id: id,
            stored: total_debt,
            computed: Decimal::MAX,
        })?;

        if computed != total_debt {
            return Err(LedgerError::Inconsistent {
                debtor_id: id,
                stored: total_debt,
                computed,
            });
        }

        Ok(Self {
            id,
            owner_id,
            alias,
            total_debt,
            debts,
            version,
        })
    }

    /// Appends a signed entry and adjusts the running total.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the new total is not representable.
    /// The record is left untouched in that case.
    pub fn record(&mut self, amount: Decimal, at: DateTime<Utc>) -> Result<&DebtEntry, LedgerError> {
        let total = self
            .total_debt
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow {
                total: self.total_debt,
                amount,
            })?;

        self.total_debt = total;
        self.debts.push(DebtEntry {
            id: EntryId::new(),
            amount,
            date: at,
        });

        let last = self.debts.len() - 1;
        Ok(&self.debts[last])
    }

    /// Returns a copy stamped with the version the store assigned.
    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Record identifier.
    #[must_use]
    pub const fn id(&self) -> DebtorId {
        self.id
    }

    /// Owning user.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Alias as first entered.
    #[must_use]
    pub const fn alias(&self) -> &DebtorAlias {
        &self.alias
    }

    /// Cached sum of all entry amounts.
    #[must_use]
    pub const fn total_debt(&self) -> Decimal {
        self.total_debt
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn debts(&self) -> &[DebtEntry] {
        &self.debts
    }

    /// Optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> i64 {
        self.version
    }

    /// Returns true if the balance has been paid off.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.total_debt <= Decimal::ZERO
    }
}

/// Sums entry amounts, or `None` on overflow.
pub(crate) fn sum_entries(entries: &[DebtEntry]) -> Option<Decimal> {
    entries
        .iter()
        .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount))
}

/// Result of adding a debt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddDebtOutcome {
    /// A new debtor was opened.
    Created(Debtor),
    /// An existing debtor received another entry.
    Updated(Debtor),
}

impl AddDebtOutcome {
    /// The debtor after the operation.
    #[must_use]
    pub const fn debtor(&self) -> &Debtor {
        match self {
            Self::Created(d) | Self::Updated(d) => d,
        }
    }

    /// Consumes the outcome, returning the debtor.
    #[must_use]
    pub fn into_debtor(self) -> Debtor {
        match self {
            Self::Created(d) | Self::Updated(d) => d,
        }
    }
}

/// Result of a payment, returned to the caller rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment recorded; the debtor still owes money.
    Recorded(Debtor),
    /// Payment brought the balance to zero and the record was removed.
    Settled {
        /// Identifier of the removed record.
        debtor_id: DebtorId,
        /// Alias of the removed record.
        alias: DebtorAlias,
    },
    /// No debtor with that alias exists for the owner.
    DebtorNotFound,
    /// Payment is larger than the outstanding balance.
    ExceedsDebt {
        /// Balance at the time of the attempt.
        total_debt: Decimal,
    },
}

impl PaymentOutcome {
    /// Outcome code reported to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Recorded(_) | Self::Settled { .. } => "SUCCESS",
            Self::DebtorNotFound => "DEBTOR_NOT_FOUND",
            Self::ExceedsDebt { .. } => "PAYMENT_EXCEEDS_DEBT",
        }
    }

    /// Returns true if the payment was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Recorded(_) | Self::Settled { .. })
    }
}
